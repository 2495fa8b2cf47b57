use bevy::prelude::*;

use crate::ring::RingGeometry;
use crate::rotation::{Direction, RotationController, RotationState};
use crate::settings::CarouselSettings;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotateRequested(pub Direction);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationStarted(pub Direction);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationFinished(pub Direction);

#[derive(Component)]
#[require(Transform)]
pub struct CarouselPanel {
    /// Spawn order, never changes.
    pub index: usize,
}

/// Root of one ring widget. Panels are its children.
#[derive(Component)]
#[require(Transform)]
pub struct Carousel {
    pub controller: RotationController<Entity>,
}

impl Carousel {
    pub fn is_busy(&self) -> bool {
        self.controller.is_busy()
    }

    /// Linear progress of the running rotation, `None` while idle.
    pub fn progress(&self) -> Option<f32> {
        match self.controller.state() {
            RotationState::Animating(tween) => Some(tween.progress()),
            RotationState::Idle => None,
        }
    }

    /// Panel in the first slot of the ordering.
    pub fn front_panel(&self) -> Option<Entity> {
        self.controller.ordering().first().copied()
    }
}

pub struct RotationPlugin;

impl Plugin for RotationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RotateRequested>()
            .add_event::<RotationStarted>()
            .add_event::<RotationFinished>()
            .add_systems(Update, (handle_rotate_requests, advance_rotations).chain());
    }
}

/// One quad and one material shared by every panel.
pub fn panel_assets(
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    asset_server: &AssetServer,
    settings: &CarouselSettings,
) -> (Handle<Mesh>, Handle<StandardMaterial>) {
    let texture: Handle<Image> = asset_server.load(settings.texture.clone());
    let mesh = meshes.add(Rectangle::new(settings.panel_width, settings.panel_height));
    let material = materials.add(StandardMaterial {
        base_color_texture: Some(texture),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });
    (mesh, material)
}

pub fn spawn_panel(
    commands: &mut Commands,
    index: usize,
    position: Vec3,
    mesh: &Handle<Mesh>,
    material: &Handle<StandardMaterial>,
) -> Entity {
    commands
        .spawn((
            CarouselPanel { index },
            Transform::from_translation(position),
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Visibility::Inherited,
            InheritedVisibility::default(),
        ))
        .id()
}

pub fn spawn_carousel(
    commands: &mut Commands,
    settings: &CarouselSettings,
    mesh: &Handle<Mesh>,
    material: &Handle<StandardMaterial>,
) -> Entity {
    let carousel_id = commands
        .spawn((
            Transform::default(),
            Visibility::Inherited,
            InheritedVisibility::default(),
        ))
        .id();

    let mut panels = Vec::with_capacity(settings.item_count);
    let ring = RingGeometry::new(settings.radius, settings.item_count);
    for i in 0..settings.item_count {
        let panel = spawn_panel(commands, i, ring.home_position(i), mesh, material);
        commands.entity(carousel_id).add_child(panel);
        panels.push(panel);
    }

    let controller = RotationController::new(
        panels,
        settings.radius,
        settings.step,
        settings.animation_duration(),
        settings.easing,
    );
    commands.entity(carousel_id).insert(Carousel { controller });

    info!(
        "Spawned carousel with {} panels on radius {}",
        settings.item_count, settings.radius
    );
    carousel_id
}

/// Despawns the root and, through the hierarchy, every panel.
pub fn despawn_carousel(commands: &mut Commands, carousel: Entity) {
    commands.entity(carousel).despawn();
}

pub fn handle_rotate_requests(
    mut requests: EventReader<RotateRequested>,
    mut carousels: Query<&mut Carousel>,
    panels: Query<&Transform, With<CarouselPanel>>,
    mut started: EventWriter<RotationStarted>,
) {
    for &RotateRequested(direction) in requests.read() {
        for mut carousel in &mut carousels {
            let accepted = carousel.controller.rotate(direction, |panel| {
                panels.get(panel).map_or(Vec3::ZERO, |t| t.translation)
            });

            if accepted {
                info!("Rotating carousel {:?}", direction);
                started.write(RotationStarted(direction));
            } else {
                debug!("Ignoring {:?} rotation, carousel is busy", direction);
            }
        }
    }
}

pub fn advance_rotations(
    time: Res<Time>,
    mut carousels: Query<&mut Carousel>,
    mut panels: Query<&mut Transform, With<CarouselPanel>>,
    mut finished: EventWriter<RotationFinished>,
) {
    for mut carousel in &mut carousels {
        let Some(frame) = carousel.controller.advance(time.delta()) else {
            continue;
        };

        for (panel, position) in frame.positions {
            if let Ok(mut transform) = panels.get_mut(panel) {
                transform.translation = position;
            }
        }

        if frame.finished {
            info!("Carousel rotation {:?} finished", frame.direction);
            finished.write(RotationFinished(frame.direction));
        }
    }
}
