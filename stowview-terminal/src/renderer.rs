/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector3};
use std::io::Write;
use stowview_core::{Camera, Mesh, Triangle};

use crate::scene::{BoxStyle, Fill};

/// Character luminosity ramp for solid faces (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Sparse ramp for translucent faces, so solid boxes behind them stay readable
const GHOST_RAMP: &[char] = &[',', ';', '~'];

/// Dimmed boxes only dot empty cells
const FAINT_RAMP: &[char] = &['`'];

#[derive(Debug, Clone, Copy)]
struct Cell {
    character: char,
    color: Color,
    depth: f32,
    translucent: bool,
}

impl Cell {
    const EMPTY: Cell = Cell {
        character: ' ',
        color: Color::Reset,
        depth: f32::INFINITY,
        translucent: false,
    };
}

/// ASCII renderer that converts box meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    light_dir: Vector3<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width * height],
            light_dir: Vector3::new(0.3, 0.8, 0.6).normalize(),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::EMPTY; width * height];
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Rasterize one box. Solid boxes write depth; ghost boxes only fill
    /// cells nothing solid has claimed in front of them; faint boxes only
    /// fill empty cells.
    pub fn render_mesh(&mut self, mesh: &Mesh, model: &Matrix4<f32>, mvp: &Matrix4<f32>, style: BoxStyle) {
        for triangle in &mesh.triangles {
            self.render_triangle(triangle, model, mvp, style);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model: &Matrix4<f32>,
        mvp: &Matrix4<f32>,
        style: BoxStyle,
    ) {
        // Project vertices to screen space
        let mut screen = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            match Camera::project_with(mvp, &vertex.position, self.width as u32, self.height as u32) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        // Shade with the normal as the model rotation leaves it
        let normal = model.transform_vector(&triangle.vertices[0].normal);
        let brightness = normal.dot(&self.light_dir).max(0.0);

        let ramp = match style.fill {
            Fill::Solid => LUMINOSITY_RAMP,
            Fill::Ghost => GHOST_RAMP,
            Fill::Faint => FAINT_RAMP,
        };
        let index = ((brightness * (ramp.len() - 1) as f32) as usize).min(ramp.len() - 1);

        self.rasterize_triangle(&screen, ramp[index], style.color, style.fill);
    }

    fn rasterize_triangle(
        &mut self,
        coords: &[(f32, f32, f32); 3],
        character: char,
        color: Color,
        fill: Fill,
    ) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box clipped to the screen
        let min_x = v0.0.min(v1.0).min(v2.0).floor().max(0.0) as i32;
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = v0.1.min(v1.1).min(v2.1).floor().max(0.0) as i32;
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p)
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let cell = &mut self.cells[y as usize * self.width + x as usize];
                if depth >= cell.depth {
                    continue;
                }
                let claim = match fill {
                    Fill::Solid => true,
                    // never overwrite an opaque face, but stay behind later opaque ones
                    Fill::Ghost => cell.character == ' ' || cell.translucent,
                    Fill::Faint => cell.character == ' ',
                };
                if !claim {
                    continue;
                }
                *cell = match fill {
                    Fill::Solid => Cell {
                        character,
                        color,
                        depth,
                        translucent: false,
                    },
                    Fill::Ghost | Fill::Faint => Cell {
                        character,
                        color,
                        depth: cell.depth,
                        translucent: true,
                    },
                };
            }
        }
    }

    /// Character at a screen cell, for tests and overlays
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x].character)
    }

    /// Write the buffer to the terminal, starting at screen row `top`
    pub fn draw<W: Write>(&self, writer: &mut W, top: u16) -> std::io::Result<()> {
        for (y, row) in self.cells.chunks(self.width.max(1)).enumerate() {
            writer.queue(cursor::MoveTo(0, top + y as u16))?;
            let mut current = None;
            for cell in row {
                if current != Some(cell.color) {
                    writer.queue(SetForegroundColor(cell.color))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn framed_camera(width: usize, height: usize) -> Camera {
        let mut camera = Camera::new(width as u32, height as u32);
        camera.frame_bounds(Point3::new(-4.0, -4.0, -4.0), Point3::new(4.0, 4.0, 4.0));
        camera
    }

    fn style(color: Color, fill: Fill) -> BoxStyle {
        BoxStyle { color, fill }
    }

    #[test]
    fn test_opaque_box_fills_center() {
        let (width, height) = (40, 20);
        let camera = framed_camera(width, height);
        let mut renderer = AsciiRenderer::new(width, height);
        let mesh = Mesh::cuboid(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));
        let model = Matrix4::identity();
        renderer.render_mesh(
            &mesh,
            &model,
            &camera.view_projection(),
            style(Color::White, Fill::Solid),
        );
        assert_ne!(renderer.char_at(width / 2, height / 2), Some(' '));
        assert_eq!(renderer.char_at(0, 0), Some(' '));
    }

    #[test]
    fn test_faint_and_ghost_boxes() {
        let (width, height) = (40, 20);
        let camera = framed_camera(width, height);
        let mvp = camera.view_projection();
        let model = Matrix4::identity();
        let mut renderer = AsciiRenderer::new(width, height);
        let big = Mesh::cuboid(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));

        // dimmed boxes are still drawn
        renderer.render_mesh(&big, &model, &mvp, style(Color::Grey, Fill::Faint));
        let faint = renderer.char_at(width / 2, height / 2).unwrap();
        assert!(FAINT_RAMP.contains(&faint));

        renderer.clear();
        renderer.render_mesh(&big, &model, &mvp, style(Color::Grey, Fill::Ghost));
        let ghost = renderer.char_at(width / 2, height / 2).unwrap();
        assert!(GHOST_RAMP.contains(&ghost));

        // faint boxes never cover a ghost
        renderer.render_mesh(&big, &model, &mvp, style(Color::Grey, Fill::Faint));
        assert_eq!(renderer.char_at(width / 2, height / 2), Some(ghost));

        // an opaque box behind the translucent one still shows through
        renderer.clear();
        renderer.render_mesh(
            &Mesh::cuboid(Point3::new(0.0, 0.0, -1.0), Vector3::new(2.0, 2.0, 2.0)),
            &model,
            &mvp,
            style(Color::Red, Fill::Solid),
        );
        renderer.render_mesh(&big, &model, &mvp, style(Color::Grey, Fill::Ghost));
        renderer.render_mesh(&big, &model, &mvp, style(Color::Grey, Fill::Faint));
        let center = renderer.char_at(width / 2, height / 2).unwrap();
        assert!(LUMINOSITY_RAMP.contains(&center));
    }
}
