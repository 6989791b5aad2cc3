use cellsim::simulation::entity::{Entity, EntityKind};
use cellsim::simulation::geometric_utils as geom;
use cellsim::simulation::world::World;
use geo::Rect;
use macroquad::prelude::*;

const PAN_SPEED: f32 = 800.0;
const ZOOM_RATE: f32 = 1.5;
const MIN_ZOOM: f32 = 0.02;
const MAX_ZOOM: f32 = 8.0;
const VIEW_PADDING: f32 = 128.0;

/// View onto the world: a center point and a scale.
pub struct WorldCamera {
    pub center: geom::Vec2,
    pub zoom: f32,
}

impl WorldCamera {
    /// Camera fitting an arena of `radius` into the window.
    pub fn new(radius: f32) -> Self {
        let mut camera = Self {
            center: geom::vec2(0.0, 0.0),
            zoom: 1.0,
        };
        camera.resize(screen_width(), screen_height(), radius);
        camera
    }

    /// Refits the zoom after the window changed to `width` x `height`.
    pub fn resize(&mut self, width: f32, height: f32, radius: f32) {
        if radius > 0.0 {
            self.zoom = (width.min(height) / (2.2 * radius)).clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// WASD pans, Q/E zoom out and in.
    pub fn apply_keyboard_controls(&mut self, dt: f32) {
        let step = PAN_SPEED * dt / self.zoom;
        if is_key_down(KeyCode::W) {
            self.center.y -= step;
        }
        if is_key_down(KeyCode::S) {
            self.center.y += step;
        }
        if is_key_down(KeyCode::A) {
            self.center.x -= step;
        }
        if is_key_down(KeyCode::D) {
            self.center.x += step;
        }
        if is_key_down(KeyCode::Q) {
            self.zoom = (self.zoom / ZOOM_RATE.powf(dt)).max(MIN_ZOOM);
        }
        if is_key_down(KeyCode::E) {
            self.zoom = (self.zoom * ZOOM_RATE.powf(dt)).min(MAX_ZOOM);
        }
    }

    /// Centers on the tracked entity, if any.
    pub fn follow(&mut self, target: Option<&Entity>) {
        if let Some(entity) = target {
            self.center = entity.body.position;
        }
    }

    fn to_screen(&self, p: geom::Vec2) -> (f32, f32) {
        (
            screen_width() / 2.0 + (p.x - self.center.x) * self.zoom,
            screen_height() / 2.0 + (p.y - self.center.y) * self.zoom,
        )
    }

    fn scale(&self, length: f32) -> f32 {
        length * self.zoom
    }

    /// World-space rectangle currently on screen.
    fn visible_rect(&self) -> Rect<f32> {
        let half_width = screen_width() / 2.0 / self.zoom;
        let half_height = screen_height() / 2.0 / self.zoom;
        Rect::new(
            geom::vec2(self.center.x - half_width, self.center.y - half_height),
            geom::vec2(self.center.x + half_width, self.center.y + half_height),
        )
    }
}

fn to_color(rgb: [f32; 3]) -> Color {
    Color::new(rgb[0], rgb[1], rgb[2], 1.0)
}

/// Draws the arena, the debug grid and every entity.
pub fn render(world: &World, camera: &WorldCamera) {
    let (cx, cy) = camera.to_screen(geom::vec2(0.0, 0.0));
    let radius = camera.scale(world.radius());
    draw_circle(cx, cy, radius, Color::from_rgba(32, 32, 32, 255));
    draw_circle_lines(cx, cy, radius, 4.0, Color::from_rgba(128, 128, 128, 255));

    if world.debug() {
        for node in world.debug_geometry() {
            let min = node.rect.min();
            let (x, y) = camera.to_screen(min);
            let size = camera.scale(node.rect.width());
            if node.occupied {
                draw_rectangle(x, y, size, size, Color::from_rgba(60, 90, 60, 120));
            }
            draw_rectangle_lines(x, y, size, size, 1.0, Color::from_rgba(70, 70, 70, 255));
        }
    }

    // Rays reach well past the body, so cull with a padded circle.
    let view = camera.visible_rect();
    for (_, entity) in world.entities() {
        let reach = entity.body.radius + VIEW_PADDING;
        if entity.is_alive() && geom::circle_rect_intersects(entity.body.position, reach, &view) {
            draw_entity(entity, camera, world.params().max_energy);
        }
    }

    if let Some(tracked) = world.tracked_entity() {
        let (x, y) = camera.to_screen(tracked.body.position);
        draw_circle_lines(x, y, camera.scale(tracked.body.radius) + 4.0, 2.0, YELLOW);
    }
}

fn draw_entity(entity: &Entity, camera: &WorldCamera, max_energy: f32) {
    let (x, y) = camera.to_screen(entity.body.position);
    let radius = camera.scale(entity.body.radius).max(1.0);
    draw_circle(x, y, radius, to_color(entity.body.color));

    let EntityKind::Cell(cell) = &entity.kind else {
        return;
    };

    // vision rays, tinted with what they see
    for ray in cell.vision().rays() {
        let (sx, sy) = camera.to_screen(ray.start);
        let (ex, ey) = camera.to_screen(ray.visible_end());
        let color = ray
            .hit
            .map(|hit| to_color(hit.color))
            .unwrap_or(Color::from_rgba(200, 200, 200, 80));
        draw_line(sx, sy, ex, ey, 1.0, color);
    }

    // heading
    let tip = entity.body.position + geom::from_angle(entity.body.rotation) * entity.body.radius;
    let (tx, ty) = camera.to_screen(tip);
    draw_line(x, y, tx, ty, 2.0, RED);

    // energy ring
    let fraction = (cell.energy() / max_energy).clamp(0.0, 1.0);
    if fraction > 0.0 {
        let ring = radius + 2.0;
        let segments = (32.0 * fraction).ceil() as usize;
        let step = std::f32::consts::TAU * fraction / segments as f32;
        for i in 0..segments {
            let a0 = step * i as f32;
            let a1 = a0 + step;
            draw_line(
                x + ring * a0.cos(),
                y + ring * a0.sin(),
                x + ring * a1.cos(),
                y + ring * a1.sin(),
                1.5,
                GREEN,
            );
        }
    }
}

/// Text overlay with counts and key help, in screen space.
pub fn draw_overlay(world: &World, paused: bool) {
    let stats = world.stats();
    let lines = [
        format!("entities: {}", world.entity_count()),
        format!("cells: {}", world.cell_count()),
        format!("births: {}  deaths: {}", stats.births, stats.cell_deaths),
        format!("max generation: {}", stats.max_generation),
        format!("time: {:.1}s{}", world.time(), if paused { "  [paused]" } else { "" }),
        "WASD pan  Q/E zoom  R/T track  I grid  P pause".to_string(),
    ];

    for (i, line) in lines.iter().enumerate() {
        draw_text(line, 10.0, 20.0 + i as f32 * 18.0, 18.0, WHITE);
    }

    if let Some(tracked) = world.tracked_entity() {
        if let Some(cell) = tracked.as_cell() {
            let text = format!(
                "tracking #{}  gen {}  energy {:.1}  mass {:.1}  age {:.1}s",
                tracked.id.0,
                cell.generation(),
                cell.energy(),
                tracked.body.mass,
                cell.age()
            );
            draw_text(&text, 10.0, screen_height() - 12.0, 18.0, YELLOW);
        }
    }
}
