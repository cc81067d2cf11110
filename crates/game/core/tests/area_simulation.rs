use std::sync::Arc;

use realm_core::sync;
use realm_core::{
    Area, AreaCharacterData, AreaData, AreaObject, AreaObjectData, Character, CharacterData,
    ContentSnapshot, Env, GameConfig, Identity, ItemData, LayerMap, Modifier, Object, ObjectData,
    Origin, PcgRng, Position, Registry, ResolveError, Target,
};

/// Owns every collaborator a tick borrows through [`Env`].
struct Harness {
    content: ContentSnapshot,
    rng: PcgRng,
    registry: Registry,
    config: GameConfig,
}

impl Harness {
    fn new(content: ContentSnapshot) -> Self {
        Self::with_config(content, GameConfig::new())
    }

    fn with_config(content: ContentSnapshot, config: GameConfig) -> Self {
        Self {
            content,
            rng: PcgRng::new(7),
            registry: Registry::new(),
            config,
        }
    }

    fn env(&self) -> Env<'_> {
        Env::new(&self.content, &self.rng, &self.registry, &self.config)
    }
}

fn ids(objects: &[AreaObject]) -> Vec<Identity> {
    let mut ids: Vec<Identity> = objects.iter().map(AreaObject::identity).collect();
    ids.sort();
    ids
}

#[test]
fn near_objects_includes_the_boundary() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let area = Area::new("meadow");

    let inside = Object::spawn(&ObjectData::new("stone").with_position(1.0, 1.0), &env);
    let boundary = Object::spawn(&ObjectData::new("stone").with_position(3.0, 4.0), &env);
    let outside = Object::spawn(&ObjectData::new("stone").with_position(6.0, 0.0), &env);
    for object in [&inside, &boundary, &outside] {
        area.add_object(object.clone());
    }

    let near = ids(&area.near_objects(0.0, 0.0, 5.0));
    let mut expected = vec![
        sync::read(&inside).identity().clone(),
        sync::read(&boundary).identity().clone(),
    ];
    expected.sort();
    assert_eq!(near, expected);
}

#[test]
fn sight_range_objects_uses_each_objects_own_sight() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let area = Area::new("meadow");

    let watchtower = Object::spawn(
        &ObjectData::new("tower").with_position(0.0, 0.0).with_sight(10),
        &env,
    );
    let lamp = Object::spawn(
        &ObjectData::new("lamp").with_position(20.0, 0.0).with_sight(2),
        &env,
    );
    area.add_object(watchtower.clone());
    area.add_object(lamp);

    let seen = ids(&area.sight_range_objects(5.0, 0.0));
    assert_eq!(seen, vec![sync::read(&watchtower).identity().clone()]);
}

#[test]
fn added_objects_carry_the_area_id() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let area = Area::new("meadow");
    let hero = Character::spawn(&CharacterData::new("hero"), &env);

    area.add_object(hero.clone());

    assert_eq!(sync::read(&hero).area_id(), "meadow");
    assert_eq!(area.characters().len(), 1);
}

/// Movement takes one unit step per axis whenever the move-cooldown has elapsed.
#[test]
fn movement_steps_diagonally_over_passable_ground() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let map = LayerMap::new(10, 10, 1)
        .with_layer("ground", (0..10).flat_map(|x| (0..10).map(move |y| (x, y))));
    let area = Area::new("cave").with_map(Arc::new(map));

    let walker = Character::spawn(&CharacterData::new("walker"), &env);
    sync::write(&walker).set_destination(Position::new(4.0, 2.0));
    area.add_object(walker.clone());

    let tick = h.config.move_cooldown_ms;
    area.update(tick, &env);
    assert_eq!(sync::read(&walker).position(), Position::new(1.0, 1.0));

    area.update(tick, &env);
    assert_eq!(sync::read(&walker).position(), Position::new(2.0, 2.0));

    area.update(tick, &env);
    area.update(tick, &env);
    assert_eq!(sync::read(&walker).position(), Position::new(4.0, 2.0));
    assert!(!sync::read(&walker).moving());
}

#[test]
fn blocked_axis_is_skipped() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let map = LayerMap::new(10, 10, 1).with_layer("wall", [(1, 0)]);
    let area = Area::new("cave").with_map(Arc::new(map));

    let walker = Character::spawn(&CharacterData::new("walker"), &env);
    sync::write(&walker).set_destination(Position::new(3.0, 0.0));
    area.add_object(walker.clone());

    for _ in 0..5 {
        area.update(h.config.move_cooldown_ms, &env);
    }
    assert_eq!(sync::read(&walker).position(), Position::ORIGIN);
    assert_eq!(sync::read(&walker).move_cooldown(), h.config.move_cooldown_ms);
}

#[test]
fn movement_waits_for_the_move_cooldown() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let area = Area::new("road");
    let walker = Character::spawn(&CharacterData::new("walker"), &env);
    sync::write(&walker).set_destination(Position::new(10.0, 0.0));
    area.add_object(walker.clone());

    area.update(1, &env);
    assert_eq!(sync::read(&walker).position().x, 1.0);

    // Cooldown restarted at 50; 49 ms is not enough.
    area.update(49, &env);
    assert_eq!(sync::read(&walker).position().x, 1.0);

    area.update(1, &env);
    assert_eq!(sync::read(&walker).position().x, 2.0);
}

/// A dead character with a respawn delay is replaced by a fresh instance of
/// its definition once the delay has passed on the area clock.
#[test]
fn dead_character_respawns_with_a_new_serial() {
    let h = Harness::new(
        ContentSnapshot::new().with_character(CharacterData::new("rat").with_level(2)),
    );
    let env = h.env();
    let area = Area::from_data(
        &AreaData::new("sewer")
            .with_character(AreaCharacterData::new("rat", 5.0, 5.0).with_respawn(1000)),
        &env,
    );
    let original = area.characters().remove(0);
    let original_id = sync::read(&original).identity().clone();
    {
        let mut rat = sync::write(&original);
        rat.set_flag("bitten");
        rat.set_position(Position::new(7.0, 7.0));
        rat.take_modifiers(Origin::None, &[Modifier::health(-1000, -1000)], &env);
        assert!(!rat.live());
    }

    area.update(100, &env);
    assert_eq!(area.respawn().scheduled_at(&original_id), Some(1100));

    for _ in 0..9 {
        area.update(100, &env);
    }
    assert!(area.contains(&original_id));

    area.update(100, &env);
    assert!(!area.contains(&original_id));
    assert!(area.respawn().is_empty());
    assert_eq!(area.objects().len(), 1);

    let replacement = area.characters().remove(0);
    let rat = sync::read(&replacement);
    assert_eq!(rat.id(), "rat");
    assert_ne!(rat.identity(), &original_id);
    assert!(rat.live());
    assert_eq!(rat.level(), 2);
    assert_eq!(rat.respawn(), 1000);
    assert_eq!(rat.position(), Position::new(5.0, 5.0));
    assert!(rat.has_flag("bitten"));
    assert_eq!(rat.area_id(), "sewer");
    assert!(matches!(
        h.registry.resolve(&original_id),
        Err(ResolveError::NotFound(_))
    ));
}

#[test]
fn respawn_cycles_keep_the_registry_size_stable() {
    let h = Harness::new(
        ContentSnapshot::new()
            .with_character(CharacterData::new("rat"))
            .with_item(ItemData::new("tooth")),
    );
    let env = h.env();
    let area = Area::from_data(
        &AreaData::new("sewer")
            .with_character(AreaCharacterData::new("rat", 0.0, 0.0).with_respawn(100)),
        &env,
    );

    let mut sizes = Vec::new();
    for _ in 0..4 {
        let rat = area.characters().remove(0);
        sync::write(&rat).take_modifiers(
            Origin::None,
            &[
                Modifier::add_item("tooth", 3),
                Modifier::health(-1000, -1000),
            ],
            &env,
        );
        assert_eq!(h.registry.len(), 4);

        area.update(10, &env);
        area.update(100, &env);
        assert_eq!(area.objects().len(), 1);
        sizes.push(h.registry.len());
    }
    assert_eq!(sizes, vec![1; 4]);
}

#[test]
fn dead_character_without_respawn_stays() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let area = Area::new("sewer");
    let rat = Character::spawn(&CharacterData::new("rat"), &env);
    sync::write(&rat).set_health(0);
    area.add_object(rat.clone());

    area.update(5000, &env);
    assert!(area.respawn().is_empty());
    assert_eq!(area.objects().len(), 1);
}

#[test]
fn dead_objects_are_dequeued_without_respawning() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let area = Area::new("yard");
    let barrel = Object::spawn(&ObjectData::new("barrel").with_max_health(5), &env);
    {
        let mut b = sync::write(&barrel);
        b.set_respawn(100);
        b.set_health(0);
    }
    area.add_object(barrel.clone());

    area.update(10, &env);
    assert_eq!(area.respawn().len(), 1);

    area.update(100, &env);
    assert!(area.respawn().is_empty());
    let identity = sync::read(&barrel).identity().clone();
    assert!(area.contains(&identity));
    assert!(!sync::read(&barrel).live());
}

#[test]
fn weather_rolls_on_the_area_clock() {
    let mut config = GameConfig::new();
    config.weather_interval_ms = 100;
    let h = Harness::with_config(ContentSnapshot::new(), config);
    let env = h.env();
    let area = Area::new("plains");

    area.update(99, &env);
    assert_eq!(area.weather().changed_at, 0);

    area.update(1, &env);
    assert_eq!(area.time(), 100);
    assert_eq!(area.weather().changed_at, 100);
}

#[test]
fn teleported_objects_depart() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let area = Area::new("hall");
    let hero = Character::spawn(&CharacterData::new("hero"), &env);
    area.add_object(hero.clone());

    sync::write(&hero).take_modifiers(
        Origin::None,
        &[Modifier::area("cellar", 3.0, 4.0)],
        &env,
    );
    area.update(10, &env);

    let identity = sync::read(&hero).identity().clone();
    assert!(!area.contains(&identity));
    let departed = area.take_departed();
    assert_eq!(departed.len(), 1);
    assert_eq!(departed[0].area_id(), "cellar");
    assert_eq!(departed[0].position(), Position::new(3.0, 4.0));
    assert!(area.take_departed().is_empty());
}

#[test]
fn subareas_tick_with_their_parent() {
    let h = Harness::new(ContentSnapshot::new().with_character(CharacterData::new("guard")));
    let env = h.env();
    let castle = Area::from_data(
        &AreaData::new("castle").with_subarea(
            AreaData::new("tower").with_character(AreaCharacterData::new("guard", 1.0, 1.0)),
        ),
        &env,
    );

    castle.update(250, &env);

    let tower = castle.subarea("tower").expect("subarea");
    assert_eq!(tower.time(), 250);
    assert_eq!(castle.all_objects().len(), 1);
    assert!(castle.find("tower").is_some());
}

#[test]
fn area_data_round_trips_through_apply() {
    let h = Harness::new(
        ContentSnapshot::new()
            .with_character(CharacterData::new("guard"))
            .with_object(ObjectData::new("chest").with_max_health(10)),
    );
    let env = h.env();
    let area = Area::from_data(
        &AreaData::new("keep")
            .with_character(AreaCharacterData::new("guard", 2.0, 3.0))
            .with_object(AreaObjectData::new("chest", 4.0, 4.0))
            .with_subarea(AreaData::new("vault")),
        &env,
    );
    area.update(500, &env);

    let saved = area.data();
    area.apply(&saved, &env);

    assert_eq!(area.data(), saved);
    assert_eq!(saved.time, 500);
    assert_eq!(saved.characters.len(), 1);
    assert_eq!(saved.objects.len(), 1);
    assert_eq!(saved.subareas.len(), 1);
}

#[test]
fn apply_removes_objects_missing_from_the_record() {
    let h = Harness::new(ContentSnapshot::new().with_character(CharacterData::new("guard")));
    let env = h.env();
    let area = Area::from_data(
        &AreaData::new("keep").with_character(AreaCharacterData::new("guard", 0.0, 0.0)),
        &env,
    );
    let kept = area.data().characters.remove(0);
    let intruder = Character::spawn(&CharacterData::new("intruder"), &env);
    let intruder_id = sync::read(&intruder).identity().clone();
    area.add_object(intruder);
    assert_eq!(area.objects().len(), 2);

    area.apply(&AreaData::new("keep").with_character(kept.clone()), &env);

    assert_eq!(area.objects().len(), 1);
    let guard = area.characters().remove(0);
    assert_eq!(Some(sync::read(&guard).serial().to_string()), kept.serial);
    assert!(!h.registry.contains(&intruder_id));
}

#[test]
fn apply_releases_dropped_subareas() {
    let h = Harness::new(ContentSnapshot::new().with_character(CharacterData::new("guard")));
    let env = h.env();
    let area = Area::from_data(
        &AreaData::new("keep").with_subarea(
            AreaData::new("tower").with_character(AreaCharacterData::new("guard", 1.0, 1.0)),
        ),
        &env,
    );
    assert_eq!(h.registry.len(), 1);

    area.apply(&AreaData::new("keep"), &env);

    assert!(area.subarea("tower").is_none());
    assert!(h.registry.is_empty());
}

#[test]
fn registry_serials_are_unique_and_reset_forgets_everything() {
    let h = Harness::new(ContentSnapshot::new());
    let env = h.env();
    let first = Character::spawn(&CharacterData::new("rat"), &env);
    let second = Character::spawn(&CharacterData::new("rat"), &env);
    let first_id = sync::read(&first).identity().clone();
    let second_id = sync::read(&second).identity().clone();
    assert_ne!(first_id.serial(), second_id.serial());
    assert!(h.registry.resolve(&first_id).is_ok());

    h.registry.reset();

    assert!(h.registry.resolve(&first_id).is_err());
    assert!(h.registry.resolve(&second_id).is_err());
    let again = Character::spawn(&CharacterData::new("rat"), &env);
    assert_eq!(sync::read(&again).identity(), &first_id);
    assert!(!Arc::ptr_eq(&again, &first));
}
