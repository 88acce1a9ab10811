/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Aim at the center of a box and back off until the whole box fits
    /// the vertical field of view, looking from abeam and slightly above
    pub fn frame_bounds(&mut self, min: Point3<f32>, max: Point3<f32>) {
        let center = nalgebra::center(&min, &max);
        let radius = ((max - min).norm() / 2.0).max(1.0);
        let distance = radius / (self.fov / 2.0).sin();
        let direction = Vector3::new(0.0, 0.35, 1.0).normalize();

        self.target = center;
        self.position = center + direction * distance;
        self.near = (distance - radius).max(0.1) * 0.5;
        self.far = distance + radius * 2.0;
    }

    /// Move toward (factor < 1) or away from (factor > 1) the target
    pub fn zoom(&mut self, factor: f32) {
        let offset = self.position - self.target;
        let distance = offset.norm();
        if distance < 1e-6 {
            return;
        }
        let new_distance = (distance * factor).clamp(self.near * 2.0, self.far);
        self.position = self.target + offset * (new_distance / distance);
    }

    /// Switch between perspective and a flat profile view
    pub fn toggle_projection(&mut self) {
        self.mode = match self.mode {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        };
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Project a 3D point to screen space, returning (x, y, depth) with depth
    /// in normalized device units. Points off screen are still returned so
    /// the rasterizer can clip partly visible triangles; `None` when the
    /// point is behind the camera or outside the near/far range.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.view_projection() * model_matrix;
        Self::project_with(&mvp, point, width, height)
    }

    /// Projection times view, for callers projecting many points per frame
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Same as [`Camera::project_to_screen`] with a precomputed model-view-projection matrix
    pub fn project_with(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point.to_homogeneous();
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;

        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
