/// Terminal viewer for stowage plans
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use nalgebra::Point3;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use stowview_core::{
    Camera, LayoutStatus, RotationState, SearchCriteria, StowageError, StowagePlan, Transform,
};

pub mod renderer;
pub mod scene;

pub use renderer::AsciiRenderer;
pub use scene::{BoxStyle, ContainerScene, Fill};

/// Rows reserved at the top for the status line
const STATUS_ROWS: u16 = 1;

/// Whether keystrokes steer the view or edit the search prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    Navigate,
    Search(String),
}

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    plan: StowagePlan,
    scene: ContainerScene,
    rotation: RotationState,
    pivot: Point3<f32>,
    camera: Camera,
    renderer: AsciiRenderer,
    mode: InputMode,
    message: String,
    spinning: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(plan: StowagePlan) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let scene = ContainerScene::build(plan.containers());
        let message = match plan.layout_status() {
            LayoutStatus::Failed(reason) => format!("layout unavailable: {reason}"),
            LayoutStatus::NotLoaded => "no layout loaded".to_string(),
            LayoutStatus::Loaded(_) => String::new(),
        };

        let mut app = Self {
            plan,
            scene,
            rotation: RotationState::new(0.0, -0.6, 0.0),
            pivot: Point3::origin(),
            camera: Camera::new(width as u32, height as u32),
            renderer: AsciiRenderer::new(width as usize, view_rows(height)),
            mode: InputMode::Navigate,
            message,
            spinning: false,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.frame(width, height);
        Ok(app)
    }

    /// Fit the camera to the placed containers for a terminal of this size
    fn frame(&mut self, width: u16, height: u16) {
        let rows = view_rows(height);
        self.renderer.resize(width as usize, rows);
        // terminal cells are about twice as tall as they are wide
        self.camera.aspect = width as f32 / (rows.max(1) as f32 * 2.0);

        let (min, max) = self
            .plan
            .bounds()
            .unwrap_or((Point3::new(-10.0, 0.0, -10.0), Point3::new(10.0, 10.0, 10.0)));
        self.pivot = nalgebra::center(&min, &max);
        self.camera.frame_bounds(min, max);
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            if self.spinning {
                self.rotation.rotate(0.0, 0.01, 0.0);
            }

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Resize(width, height) => self.frame(width, height),
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => match &mut self.mode {
                InputMode::Search(query) => match code {
                    KeyCode::Enter => {
                        let query = std::mem::take(query);
                        self.mode = InputMode::Navigate;
                        self.run_search(&query);
                    }
                    KeyCode::Esc => self.mode = InputMode::Navigate,
                    KeyCode::Backspace => {
                        query.pop();
                    }
                    KeyCode::Char(c) => query.push(c),
                    _ => {}
                },
                InputMode::Navigate => self.handle_navigation(code),
            },
            _ => {}
        }
    }

    fn handle_navigation(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('w') | KeyCode::Up => self.rotation.rotate(0.1, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.rotation.rotate(-0.1, 0.0, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.rotation.rotate(0.0, -0.1, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.rotation.rotate(0.0, 0.1, 0.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.camera.zoom(0.8),
            KeyCode::Char('-') => self.camera.zoom(1.25),
            KeyCode::Char(' ') => self.spinning = !self.spinning,
            KeyCode::Char('o') => self.camera.toggle_projection(),
            KeyCode::Char('/') => self.mode = InputMode::Search(String::new()),
            KeyCode::Char('c') => {
                self.plan.reset(&mut self.scene);
                self.message = "search cleared".to_string();
            }
            _ => {}
        }
    }

    fn run_search(&mut self, query: &str) {
        match parse_query(query) {
            Ok(criteria) => {
                let outcome = self.plan.search(criteria, &mut self.scene);
                self.message = format!(
                    "{} of {} containers match",
                    outcome.matched,
                    self.scene.len()
                );
            }
            Err(err) => self.message = err.to_string(),
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let model = Transform::rotation_about(&self.rotation, &self.pivot);
        let mvp = self.camera.view_projection() * model;

        self.renderer.clear();
        for (mesh, style) in self.scene.draw_order() {
            self.renderer.render_mesh(mesh, &model, &mvp, style);
        }

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout, STATUS_ROWS)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(self.status_line().chars().take(self.renderer.width()).collect::<String>()),
            ResetColor
        )?;

        stdout.flush()
    }

    fn status_line(&self) -> String {
        match &self.mode {
            InputMode::Search(query) => format!(
                "search (id or bay=/row=/tier=/size=, Enter to run, Esc to cancel): {query}"
            ),
            InputMode::Navigate => format!(
                "stowview | {} containers, {} skipped | {} | FPS: {:.0} | WASD rotate +/- zoom o ortho / search c clear space spin q quit",
                self.scene.len(),
                self.plan.skipped().len(),
                self.message,
                self.fps
            ),
        }
    }
}

fn view_rows(height: u16) -> usize {
    height.saturating_sub(STATUS_ROWS) as usize
}

/// Read a search prompt: bare words are the container id, `field=value`
/// pairs constrain bay, row, tier or size
pub fn parse_query(query: &str) -> Result<SearchCriteria, StowageError> {
    let (mut id, mut bay, mut row, mut tier, mut size) = ("", "", "", "", "");
    for token in query.split_whitespace() {
        match token.split_once('=') {
            Some(("id", value)) => id = value,
            Some(("bay", value)) => bay = value,
            Some(("row", value)) => row = value,
            Some(("tier", value)) => tier = value,
            Some(("size", value)) => size = value,
            Some((field, _)) => {
                return Err(StowageError::InvalidCriterion {
                    field: "query",
                    value: field.to_string(),
                })
            }
            None => id = token,
        }
    }
    SearchCriteria::from_inputs(id, bay, row, tier, size)
}
