use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::effect::EffectData;
use crate::error::GameError;
use crate::env::ContentSnapshot;
use crate::item::{Item, ItemData};
use crate::modifier::Modifier;
use crate::requirement::Requirement;
use crate::skill::{SavedSkill, SkillData};
use crate::sync;
use crate::target::{Origin, Target};
use crate::testing::Fixture;
use crate::useaction::UseActionData;

fn smite(modifier: Modifier) -> SkillData {
    SkillData::new("smite").with_use_action(
        UseActionData::default()
            .with_cast_time(500)
            .with_cooldown(3000)
            .with_target_modifier(modifier),
    )
}

#[test]
fn live_tracks_health_after_every_set() {
    let fx = Fixture::new(ContentSnapshot::new());
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero"), &env);
    assert!(hero.live());
    assert_eq!(hero.health(), hero.max_health());

    hero.set_health(-5);
    assert_eq!(hero.health(), 0);
    assert!(!hero.live());
    assert!(hero.agony());

    hero.set_health(99_999);
    assert_eq!(hero.health(), hero.max_health());
    assert!(hero.live());
    assert!(!hero.agony());
}

#[test]
fn level_up_restores_vitals_and_resets_experience() {
    let fx = Fixture::new(ContentSnapshot::new());
    let env = fx.env();
    let mut data = CharacterData::new("hero");
    data.experience = 1500;
    let mut hero = Character::new(&data, &env);
    hero.set_health(10);
    hero.set_mana(0);

    hero.update(0, &env);

    assert_eq!(hero.level(), 2);
    assert_eq!(hero.experience(), 0);
    assert_eq!(hero.health(), hero.max_health());
    assert_eq!(hero.mana(), hero.max_mana());
}

#[test]
fn cooldowns_decay_below_zero() {
    let fx = Fixture::new(ContentSnapshot::new());
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero"), &env);
    hero.update(30, &env);
    assert_eq!(hero.use_cooldown(), -30);
    assert_eq!(hero.move_cooldown(), -30);
}

#[test]
fn use_on_cooling_skill_is_not_ready() {
    let fx = Fixture::new(ContentSnapshot::new().with_skill(smite(Modifier::health(-1, -1))));
    let env = fx.env();
    let mut data = CharacterData::new("hero");
    data.skills.push(SavedSkill {
        id: "smite".into(),
        cooldown: 500,
    });
    let mut hero = Character::new(&data, &env);

    assert_eq!(
        hero.use_skill("smite", &env),
        Err(UseError::NotReady {
            usable: "smite".into()
        })
    );
    assert!(hero.casted().is_none());
}

#[test]
fn use_while_moving_is_rejected() {
    let fx = Fixture::new(ContentSnapshot::new().with_skill(smite(Modifier::health(-1, -1))));
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero").with_skill("smite"), &env);
    hero.set_destination(Position::new(10.0, 0.0));
    assert!(hero.moving());

    let err = hero.use_skill("smite", &env).unwrap_err();
    assert!(matches!(err, UseError::InMove { .. }));
    assert_eq!(err.error_code(), "USE_IN_MOVE");
}

#[test]
fn use_without_required_items_or_flags_fails() {
    let skill = SkillData::new("unlock").with_use_action(
        UseActionData::default()
            .with_requirement(Requirement::item("key", 1, true))
            .with_requirement(Requirement::flag("knows_lock")),
    );
    let fx = Fixture::new(
        ContentSnapshot::new()
            .with_skill(skill)
            .with_item(ItemData::new("key")),
    );
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero").with_skill("unlock"), &env);

    assert!(matches!(
        hero.use_skill("unlock", &env),
        Err(UseError::RequirementsNotMet { .. })
    ));

    hero.take_modifiers(Origin::None, &[Modifier::add_item("key", 1)], &env);
    assert!(matches!(
        hero.use_skill("unlock", &env),
        Err(UseError::RequirementsNotMet { .. })
    ));

    hero.set_flag("knows_lock");
    assert_eq!(hero.use_skill("unlock", &env), Ok(()));
    hero.update(0, &env);
    assert_eq!(hero.inventory().count("key"), 0, "charged on resolution");
}

#[test]
fn dead_or_actionless_use_is_silent_success() {
    let fx = Fixture::new(ContentSnapshot::new().with_skill(smite(Modifier::health(-1, -1))));
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero").with_skill("smite"), &env);

    assert_eq!(hero.use_skill("unknown", &env), Ok(()));
    assert!(hero.casted().is_none());

    hero.set_health(0);
    assert_eq!(hero.use_skill("smite", &env), Ok(()));
    assert!(hero.casted().is_none());
}

#[test]
fn cast_resolves_after_cast_time_and_starts_cooldowns() {
    let fx = Fixture::new(ContentSnapshot::new().with_skill(smite(Modifier::health(-10, -10))));
    let env = fx.env();
    let hero = Character::spawn(&CharacterData::new("hero").with_skill("smite"), &env);
    let rat = Character::spawn(&CharacterData::new("rat"), &env);
    let rat_id = sync::read(&rat).identity().clone();

    let mut h = sync::write(&hero);
    h.set_target(Some(rat_id));
    h.use_skill("smite", &env).expect("ready");

    h.update(250, &env);
    assert_eq!(sync::read(&rat).health(), 50);
    assert!(h.casted().is_some());

    h.update(250, &env);
    assert_eq!(sync::read(&rat).health(), 40);
    assert!(h.casted().is_none());
    assert_eq!(h.use_cooldown(), 2000);
    let cooldown = h.skill("smite").and_then(Skill::use_action).map(UseAction::cooldown);
    assert_eq!(cooldown, Some(3000));
    assert!(matches!(
        h.use_skill("smite", &env),
        Err(UseError::NotReady { .. })
    ));
}

#[test]
fn untargeted_cast_falls_back_onto_user() {
    let fx = Fixture::new(ContentSnapshot::new().with_skill(smite(Modifier::health(-10, -10))));
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero").with_skill("smite"), &env);

    hero.use_skill("smite", &env).expect("ready");
    hero.update(500, &env);

    assert_eq!(hero.health(), 40);
}

#[test]
fn killing_blow_credits_the_caster() {
    let fx = Fixture::new(ContentSnapshot::new().with_skill(smite(Modifier::health(-60, -60))));
    let env = fx.env();
    let hero = Character::spawn(&CharacterData::new("hero").with_skill("smite"), &env);
    let rat = Character::spawn(&CharacterData::new("rat").with_level(3), &env);
    let rat_id = sync::read(&rat).identity().clone();

    let mut h = sync::write(&hero);
    h.set_target(Some(rat_id.clone()));
    h.use_skill("smite", &env).expect("ready");
    h.update(500, &env);

    assert!(!sync::read(&rat).live());
    assert_eq!(
        h.kills(),
        &[Kill {
            victim: rat_id,
            experience: 300
        }]
    );
    assert_eq!(h.experience(), 300);
}

#[test]
fn hostile_effects_are_remembered() {
    let skill = SkillData::new("bite")
        .with_use_action(UseActionData::default().with_target_effect("bleed"));
    let bleed = EffectData::new("bleed")
        .with_over_time_modifier(Modifier::health(-1, -1))
        .with_duration(3000)
        .hostile();
    let fx = Fixture::new(ContentSnapshot::new().with_skill(skill).with_effect(bleed));
    let env = fx.env();
    let wolf = Character::spawn(&CharacterData::new("wolf").with_skill("bite"), &env);
    let hero = Character::spawn(&CharacterData::new("hero"), &env);
    let wolf_id = sync::read(&wolf).identity().clone();
    let hero_id = sync::read(&hero).identity().clone();

    {
        let mut w = sync::write(&wolf);
        w.set_target(Some(hero_id));
        w.use_skill("bite", &env).expect("ready");
        w.update(0, &env);
    }

    let h = sync::read(&hero);
    assert_eq!(h.attitude_for(&wolf_id), Attitude::Hostile);
    assert!(h.has_effect("bleed"));
    assert_eq!(h.health(), 49);
}

#[test]
fn melee_hit_effects_carry_user_damage() {
    let skill = SkillData::new("strike")
        .with_use_action(UseActionData::default().with_target_effect("swing"));
    let swing = EffectData::new("swing").melee_hit();
    let fx = Fixture::new(ContentSnapshot::new().with_skill(skill).with_effect(swing));
    let env = fx.env();
    let hero = Character::spawn(&CharacterData::new("hero").with_skill("strike"), &env);
    let rat = Character::spawn(&CharacterData::new("rat"), &env);
    let rat_id = sync::read(&rat).identity().clone();

    {
        let mut h = sync::write(&hero);
        h.set_target(Some(rat_id));
        h.use_skill("strike", &env).expect("ready");
        h.update(0, &env);
    }

    // zero attributes hit for 1..=10
    let health = sync::read(&rat).health();
    assert!((40..=49).contains(&health), "health {health}");
    assert!(!sync::read(&rat).has_effect("swing"), "instant effect dropped");
}

#[test]
fn passive_effects_are_injected_once() {
    let skill = SkillData::new("toughness")
        .with_passive_effect("tough")
        .with_passive_requirement(Requirement::Level { min: 1 });
    let tough = EffectData::new("tough")
        .with_modifier(Modifier::Attribute(Attributes::new(0, 1, 0, 0, 0)))
        .infinite();
    let fx = Fixture::new(ContentSnapshot::new().with_skill(skill).with_effect(tough));
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero").with_skill("toughness"), &env);

    hero.update(100, &env);
    hero.update(100, &env);

    assert_eq!(hero.effects().filter(|e| e.id() == "tough").count(), 1);
    assert_eq!(hero.attributes().con, 1);
}

#[test]
fn unmet_passive_requirements_inject_nothing() {
    let skill = SkillData::new("rage")
        .with_passive_effect("enraged")
        .with_passive_requirement(Requirement::flag("angry"));
    let fx = Fixture::new(
        ContentSnapshot::new()
            .with_skill(skill)
            .with_effect(EffectData::new("enraged").infinite()),
    );
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero").with_skill("rage"), &env);

    hero.update(100, &env);
    assert!(!hero.has_effect("enraged"));

    hero.set_flag("angry");
    hero.update(100, &env);
    assert!(hero.has_effect("enraged"));
}

#[test]
fn expired_attribute_buff_is_reversed_and_removed() {
    let fx = Fixture::new(ContentSnapshot::new());
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero"), &env);
    let buff = EffectData::new("might")
        .with_modifier(Modifier::Attribute(Attributes::new(2, 0, 0, 0, 0)))
        .with_duration(1000);
    let effect = Effect::new(&buff, &env);

    hero.take_effect(effect, Origin::Itself, &env);
    assert_eq!(hero.attributes().str, 2);

    hero.update(600, &env);
    hero.update(600, &env);

    assert_eq!(hero.attributes().str, 0);
    assert!(!hero.has_effect("might"));
}

#[test]
fn transfer_moves_items_to_the_source() {
    let fx = Fixture::new(
        ContentSnapshot::new()
            .with_skill(smite(Modifier::transfer_item("gold", 2)))
            .with_item(ItemData::new("gold")),
    );
    let env = fx.env();
    let hero = Character::spawn(&CharacterData::new("hero").with_skill("smite"), &env);
    let rat = Character::spawn(&CharacterData::new("rat"), &env);
    let rat_id = sync::read(&rat).identity().clone();
    sync::write(&rat).take_modifiers(Origin::None, &[Modifier::add_item("gold", 3)], &env);

    let mut h = sync::write(&hero);
    h.set_target(Some(rat_id));
    h.use_skill("smite", &env).expect("ready");
    h.update(500, &env);

    assert_eq!(h.inventory().count("gold"), 2);
    assert_eq!(sync::read(&rat).inventory().count("gold"), 1);
}

#[test]
fn hook_runs_once_per_modifier() {
    let fx = Fixture::new(ContentSnapshot::new());
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero"), &env);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    hero.set_on_modifier_taken(Some(Box::new(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    })));

    hero.take_modifiers(
        Origin::None,
        &[
            Modifier::flag("a", false),
            Modifier::mana(-1, -1),
            Modifier::area("crypt", 4.0, 5.0),
        ],
        &env,
    );

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(hero.area_id(), "crypt");
    assert_eq!(hero.position(), Position::new(4.0, 5.0));
    assert!(!hero.moving());
}

#[test]
fn memory_overrides_base_attitude() {
    let fx = Fixture::new(ContentSnapshot::new());
    let env = fx.env();
    let mut guard = Character::new(&CharacterData::new("guard"), &env);
    let thief = Identity::new("thief", "9");

    assert_eq!(guard.attitude_for(&thief), Attitude::Neutral);
    guard.take_modifiers(
        Origin::Remote(thief.clone()),
        &[Modifier::Memory {
            attitude: Attitude::Hostile,
        }],
        &env,
    );
    assert_eq!(guard.attitude_for(&thief), Attitude::Hostile);
    guard.forget(&thief);
    assert_eq!(guard.attitude_for(&thief), Attitude::Neutral);
}

#[test]
fn target_list_holds_one_entry() {
    let fx = Fixture::new(ContentSnapshot::new());
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero"), &env);
    hero.set_target(Some(Identity::new("rat", "1")));
    hero.set_target(Some(Identity::new("rat", "2")));
    assert_eq!(hero.targets(), &[Identity::new("rat", "2")]);
    hero.set_target(None);
    assert!(hero.targets().is_empty());
}

#[test]
fn data_apply_round_trip() {
    let poison = EffectData::new("poison")
        .with_over_time_modifier(Modifier::health(-1, -1))
        .with_duration(5000);
    let fx = Fixture::new(
        ContentSnapshot::new()
            .with_effect(poison.clone())
            .with_item(ItemData::new("gold")),
    );
    let env = fx.env();
    let mut hero = Character::new(
        &CharacterData::new("hero")
            .with_attributes(Attributes::new(1, 2, 0, 1, 0))
            .with_position(3.0, 4.0),
        &env,
    );
    hero.set_flag("met_king");
    hero.take_modifiers(Origin::None, &[Modifier::add_item("gold", 2)], &env);
    hero.take_effect(Effect::new(&poison, &env), Origin::None, &env);
    hero.update(1200, &env);

    let saved = hero.data();
    hero.apply(&saved, &env);
    let reapplied = hero.data();

    assert_eq!(reapplied, saved);
    assert_eq!(reapplied.health, Some(hero.health()));
    assert_eq!(reapplied.effects.len(), 1);
    assert_eq!(reapplied.effects[0].time, 3800);
    assert_eq!(reapplied.flags, vec!["met_king".to_string()]);
}

#[test]
fn saved_record_restores_into_fresh_character() {
    let poison = EffectData::new("poison")
        .with_over_time_modifier(Modifier::health(-1, -1))
        .with_duration(5000);
    let fx = Fixture::new(ContentSnapshot::new().with_effect(poison.clone()));
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero"), &env);
    hero.take_effect(Effect::new(&poison, &env), Origin::None, &env);
    let saved = hero.data();
    drop(hero);
    fx.registry.reset();

    let restored = Character::new(&saved, &env);
    assert_eq!(restored.serial(), saved.serial.as_deref().unwrap_or_default());
    assert_eq!(restored.data().effects, saved.effects);
    assert_eq!(restored.health(), saved.health.unwrap_or_default());
}

#[test]
fn item_cast_cools_down_the_item_used() {
    let potion = ItemData::new("potion").with_use_action(
        UseActionData::default()
            .with_cooldown(10_000)
            .with_user_modifier(Modifier::health(1, 1)),
    );
    let fx = Fixture::new(ContentSnapshot::new().with_item(potion));
    let env = fx.env();
    let mut hero = Character::new(&CharacterData::new("hero"), &env);
    hero.take_modifiers(Origin::None, &[Modifier::add_item("potion", 2)], &env);
    let potions = hero.inventory().items_with_id("potion");
    let (first, second) = (potions[0].clone(), potions[1].clone());
    let cooldown = |hero: &Character, item: &Identity| {
        hero.inventory()
            .item(item)
            .and_then(Item::use_action)
            .map(UseAction::cooldown)
    };

    hero.use_item(&second, &env).expect("ready");
    hero.update(0, &env);
    assert!(hero.casted().is_none());
    assert_eq!(cooldown(&hero, &second), Some(10_000));
    assert_eq!(cooldown(&hero, &first), Some(0));

    hero.update(2100, &env);
    assert!(matches!(
        hero.use_item(&second, &env),
        Err(UseError::NotReady { .. })
    ));
    assert_eq!(hero.use_item(&first, &env), Ok(()));
}

#[test]
fn effects_for_a_missing_target_are_unregistered() {
    let skill = SkillData::new("bite")
        .with_use_action(UseActionData::default().with_target_effect("bleed"));
    let bleed = EffectData::new("bleed").with_duration(3000);
    let fx = Fixture::new(ContentSnapshot::new().with_skill(skill).with_effect(bleed));
    let env = fx.env();
    let mut wolf = Character::new(&CharacterData::new("wolf").with_skill("bite"), &env);
    wolf.set_target(Some(Identity::new("ghost", "404")));
    let before = fx.registry.len();

    wolf.use_skill("bite", &env).expect("ready");
    wolf.update(0, &env);

    assert!(wolf.casted().is_none());
    assert_eq!(fx.registry.len(), before);
}

#[test]
fn release_unregisters_owned_items_and_effects() {
    let might = EffectData::new("might").infinite();
    let fx = Fixture::new(
        ContentSnapshot::new()
            .with_item(ItemData::new("tooth"))
            .with_effect(might),
    );
    let env = fx.env();
    let mut rat = Character::new(&CharacterData::new("rat"), &env);
    rat.take_modifiers(Origin::None, &[Modifier::add_item("tooth", 3)], &env);
    let effect = Effect::from_content("might", None, &env).expect("defined");
    rat.take_effect(effect, Origin::None, &env);
    assert_eq!(fx.registry.len(), 5);

    rat.release(&fx.registry);

    assert!(fx.registry.is_empty());
}
