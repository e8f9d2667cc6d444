//! Renderable entities: a transform per mesh piece, nothing more.
//!
//! The rendering subsystem is an external consumer of these matrices; the
//! core only ever writes them. Entities hold a [`TransformSet`] by
//! composition instead of inheriting from a shared model base, since their
//! update paths have nothing else in common.

use glam::{Mat4, Vec3};

use shared::{DeviceClass, Pose};

/// Uniform scale applied to the head model.
pub const HEAD_SCALE: f32 = 0.2;
/// Uniform scale applied to the paddle model.
pub const PADDLE_SCALE: f32 = 0.05;

/// World matrices for each mesh piece of a model.
#[derive(Debug, Clone)]
pub struct TransformSet {
    pieces: Vec<Mat4>,
}

impl TransformSet {
    pub fn new(piece_count: usize, initial: Mat4) -> Self {
        Self { pieces: vec![initial; piece_count] }
    }

    pub fn pieces(&self) -> &[Mat4] {
        &self.pieces
    }

    pub fn set_all(&mut self, world: Mat4) {
        for piece in &mut self.pieces {
            *piece = world;
        }
    }

    pub fn set_piece(&mut self, index: usize, world: Mat4) {
        self.pieces[index] = world;
    }

    /// Post-multiplies a local-space translation onto every piece.
    pub fn translate_all(&mut self, offset: Vec3) {
        let translation = Mat4::from_translation(offset);
        for piece in &mut self.pieces {
            *piece *= translation;
        }
    }

    /// Unweighted centroid of the piece origins. This is the model's
    /// "position" for game purposes, not a true center of mass.
    pub fn centroid(&self) -> Vec3 {
        let sum: Vec3 = self.pieces.iter().map(|m| m.w_axis.truncate()).sum();
        sum / self.pieces.len() as f32
    }
}

/// Rest-pose corner vertices of the paddle model, in model space. The
/// per-frame AABB is these eight points pushed through the current world
/// transform.
pub const PADDLE_REST_VERTICES: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, -0.25),
    Vec3::new(-1.0, -1.0, 0.25),
    Vec3::new(-1.0, 1.0, -0.25),
    Vec3::new(-1.0, 1.0, 0.25),
    Vec3::new(1.0, -1.0, -0.25),
    Vec3::new(1.0, -1.0, 0.25),
    Vec3::new(1.0, 1.0, -0.25),
    Vec3::new(1.0, 1.0, 0.25),
];

#[derive(Debug, Clone)]
pub struct Head {
    pub transforms: TransformSet,
    pub pose: Pose,
}

impl Head {
    pub fn new() -> Self {
        let mut head = Self {
            transforms: TransformSet::new(1, Mat4::IDENTITY),
            pose: Pose::IDENTITY,
        };
        head.update(Pose::IDENTITY);
        head
    }

    pub fn update(&mut self, pose: Pose) {
        self.pose = pose;
        let world = Mat4::from_scale_rotation_translation(
            Vec3::splat(HEAD_SCALE),
            pose.orientation,
            pose.position,
        );
        self.transforms.set_all(world);
    }
}

#[derive(Debug, Clone)]
pub struct Paddle {
    pub transforms: TransformSet,
    pub pose: Pose,
    world: Mat4,
}

impl Paddle {
    pub fn new() -> Self {
        let mut paddle = Self {
            transforms: TransformSet::new(1, Mat4::IDENTITY),
            pose: Pose::IDENTITY,
            world: Mat4::IDENTITY,
        };
        paddle.update(Pose::IDENTITY);
        paddle
    }

    pub fn update(&mut self, pose: Pose) {
        self.pose = pose;
        self.world = Mat4::from_scale_rotation_translation(
            Vec3::splat(PADDLE_SCALE),
            pose.orientation,
            pose.position,
        );
        self.transforms.set_all(self.world);
    }

    /// Rest vertices pushed through the current world transform; input to
    /// the per-frame AABB rebuild.
    pub fn world_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        PADDLE_REST_VERTICES
            .iter()
            .map(move |v| self.world.transform_point3(*v))
    }
}

/// How a player's transforms get their data each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    /// Driven by this process's tracking hardware.
    LocalTracked,
    /// Mirror of the other physical device, driven by pulled poses.
    RemoteDriven,
}

pub struct Player {
    pub number: u8,
    pub device: DeviceClass,
    pub kind: PlayerKind,
    pub head: Head,
    pub paddle: Paddle,
}

impl Player {
    pub fn new(device: DeviceClass, kind: PlayerKind) -> Self {
        Self {
            number: device.player_number(),
            device,
            kind,
            head: Head::new(),
            paddle: Paddle::new(),
        }
    }
}
