use colorcube_core::config::CameraSection;
use colorcube_core::pick::{screen_ray, Ray};
use glam::{Mat4, Vec2, Vec3};

/// Radians of orbit per pixel of mouse travel.
const ORBIT_SPEED: f32 = 0.005;

/// Keeps the eye off the poles, where `look_at` with a Y up vector degenerates.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 1e-3;

/// Linear eye-position flight toward a preset view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFlight {
    pub from: Vec3,
    pub to: Vec3,
    pub elapsed: f32,
    pub duration: f32,
}

impl CameraFlight {
    /// Interpolation factor in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).min(1.0)
    }

    pub fn eye(&self) -> Vec3 {
        self.from.lerp(self.to, self.progress())
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Damped orbit camera around a target point.
pub struct Camera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_rad: f32,
    near: f32,
    far: f32,
    min_distance: f32,
    max_distance: f32,
    damping: f32,
    flight_seconds: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    flight: Option<CameraFlight>,
}

impl Camera {
    pub fn new(config: &CameraSection) -> Self {
        let mut camera = Self {
            target: Vec3::ZERO,
            distance: 1.0,
            yaw: 0.0,
            pitch: 0.0,
            fov_y_rad: config.fov_y_deg.to_radians(),
            near: config.near,
            far: config.far,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            damping: config.damping,
            flight_seconds: config.flight_seconds,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            flight: None,
        };
        camera.set_eye(Vec3::from(config.initial_eye));
        camera
    }

    pub fn eye_position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Place the eye at `eye`, keeping the current target.
    pub fn set_eye(&mut self, eye: Vec3) {
        let offset = eye - self.target;
        self.distance = offset
            .length()
            .clamp(self.min_distance, self.max_distance);
        let len = offset.length().max(f32::EPSILON);
        self.pitch = (offset.y / len).clamp(-1.0, 1.0).asin().clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw = offset.x.atan2(offset.z);
    }

    /// Buffer an orbit drag of `dx`, `dy` pixels. Ignored during a flight.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if self.flight.is_some() {
            return;
        }
        self.yaw_velocity -= dx * ORBIT_SPEED;
        self.pitch_velocity += dy * ORBIT_SPEED;
        if self.damping == 0.0 {
            self.apply_velocity(1.0);
        }
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        if self.flight.is_some() {
            return;
        }
        let eye = self.eye_position();
        let forward = (self.target - eye).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward).normalize();

        let speed = self.distance * 0.002;
        self.target += right * (-dx * speed) + up * (dy * speed);
    }

    pub fn zoom(&mut self, delta: f32) {
        if self.flight.is_some() {
            return;
        }
        self.distance = (self.distance - delta * self.distance * 0.1)
            .clamp(self.min_distance, self.max_distance);
    }

    /// Start flying toward `eye`. Returns false if a flight is already running.
    pub fn fly_to(&mut self, eye: Vec3) -> bool {
        if self.flight.is_some() {
            return false;
        }
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.flight = Some(CameraFlight {
            from: self.eye_position(),
            to: eye,
            elapsed: 0.0,
            duration: self.flight_seconds,
        });
        true
    }

    pub fn flight(&self) -> Option<&CameraFlight> {
        self.flight.as_ref()
    }

    /// Advance damping and any active flight by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if let Some(mut flight) = self.flight.take() {
            flight.elapsed += dt.max(0.0);
            self.set_eye(flight.eye());
            if !flight.finished() {
                self.flight = Some(flight);
            }
            return;
        }

        if self.damping > 0.0 {
            self.apply_velocity(self.damping);
        }
    }

    pub fn view_proj(&self, width: f32, height: f32) -> Mat4 {
        let eye = self.eye_position();
        let view = Mat4::look_at_rh(eye, self.target, Vec3::Y);
        let aspect = width / height.max(1.0);
        let proj = Mat4::perspective_rh(self.fov_y_rad, aspect, self.near, self.far);
        proj * view
    }

    /// World-space ray through `cursor` (CSS pixels from the canvas's top-left).
    pub fn cursor_ray(&self, cursor: Vec2, width: f32, height: f32) -> Option<Ray> {
        let inv = self.view_proj(width, height).inverse();
        screen_ray(cursor, Vec2::new(width, height), inv)
    }

    fn apply_velocity(&mut self, factor: f32) {
        self.yaw += self.yaw_velocity * factor;
        self.pitch = (self.pitch + self.pitch_velocity * factor).clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw_velocity *= 1.0 - factor;
        self.pitch_velocity *= 1.0 - factor;
    }
}
