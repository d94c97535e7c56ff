//! Viewport collaborator: rays, projection, camera and navigation lock.

use manip_math::{Mat3, Ray, Vec2, Vec3};

/// Camera pose and projection parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Unit view direction
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f64,
    /// Viewport height in pixels
    pub viewport_height: f64,
}

impl CameraState {
    /// Camera at `eye` looking at `target`, with `up` as the approximate up hint.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - eye).try_normalize(1e-12).unwrap_or(Vec3::NEG_Z);
        let right = forward
            .cross(up)
            .try_normalize(1e-12)
            .unwrap_or_else(|| forward.any_orthogonal());
        let up = right.cross(forward);

        Self {
            position: eye,
            forward,
            up,
            right,
            fov_y: 60f64.to_radians(),
            viewport_height: 720.0,
        }
    }

    pub fn with_fov(mut self, fov_y: f64) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// World size of one pixel at `distance` from the camera
    pub fn pixel_size_at(&self, distance: f64) -> f64 {
        if self.viewport_height <= 0.0 {
            return 0.0;
        }
        2.0 * distance * (self.fov_y * 0.5).tan() / self.viewport_height
    }
}

/// Camera navigation inputs; all enabled unless the manipulator holds a lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationFlags {
    pub rotate: bool,
    pub translate: bool,
    pub zoom: bool,
    pub tilt: bool,
    pub look: bool,
}

impl NavigationFlags {
    pub const ALL: Self = Self {
        rotate: true,
        translate: true,
        zoom: true,
        tilt: true,
        look: true,
    };

    pub const NONE: Self = Self {
        rotate: false,
        translate: false,
        zoom: false,
        tilt: false,
        look: false,
    };
}

impl Default for NavigationFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Host viewport services used by the manipulator.
pub trait Viewport {
    /// Pick ray through a screen point (pixels, origin top-left)
    fn ray_at(&self, screen: Vec2) -> Option<Ray>;

    /// Project a world point to the screen; `None` if behind the camera
    fn world_to_screen(&self, point: Vec3) -> Option<Vec2>;

    /// Current camera, if one is attached
    fn camera(&self) -> Option<CameraState>;

    /// Ask the host to redraw. Fire and forget.
    fn request_redraw(&mut self);

    fn navigation(&self) -> NavigationFlags;

    fn set_navigation(&mut self, flags: NavigationFlags);

    /// Tangent-plane basis (columns east, north, up) at a world point.
    fn tangent_frame(&self, _origin: Vec3) -> Option<Mat3> {
        None
    }
}

/// Pinhole perspective viewport for hosts without their own camera model.
#[derive(Clone, Debug)]
pub struct PerspectiveViewport {
    pub camera: CameraState,
    pub width: f64,
    pub height: f64,
    pub navigation: NavigationFlags,
    /// Optional constant tangent basis
    pub tangent: Option<Mat3>,
    redraw_requests: u64,
}

impl PerspectiveViewport {
    pub fn new(camera: CameraState, width: f64, height: f64) -> Self {
        let mut camera = camera;
        camera.viewport_height = height;
        Self {
            camera,
            width,
            height,
            navigation: NavigationFlags::ALL,
            tangent: None,
            redraw_requests: 0,
        }
    }

    /// Get the aspect ratio.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Update viewport size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.camera.viewport_height = height;
    }

    /// Number of redraws requested so far
    pub fn redraw_requests(&self) -> u64 {
        self.redraw_requests
    }

    fn half_extents(&self) -> (f64, f64) {
        let half_h = (self.camera.fov_y * 0.5).tan();
        (half_h * self.aspect_ratio(), half_h)
    }
}

impl Viewport for PerspectiveViewport {
    fn ray_at(&self, screen: Vec2) -> Option<Ray> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let ndc_x = 2.0 * screen.x / self.width - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / self.height;
        let (half_w, half_h) = self.half_extents();

        let c = &self.camera;
        let direction = c.forward + c.right * (ndc_x * half_w) + c.up * (ndc_y * half_h);
        Some(Ray::new(c.position, direction))
    }

    fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let c = &self.camera;
        let d = point - c.position;
        let depth = d.dot(c.forward);
        if depth <= 1e-9 {
            return None;
        }
        let (half_w, half_h) = self.half_extents();
        let ndc_x = d.dot(c.right) / (depth * half_w);
        let ndc_y = d.dot(c.up) / (depth * half_h);

        Some(Vec2::new(
            (ndc_x + 1.0) * 0.5 * self.width,
            (1.0 - ndc_y) * 0.5 * self.height,
        ))
    }

    fn camera(&self) -> Option<CameraState> {
        Some(self.camera)
    }

    fn request_redraw(&mut self) {
        self.redraw_requests += 1;
    }

    fn navigation(&self) -> NavigationFlags {
        self.navigation
    }

    fn set_navigation(&mut self, flags: NavigationFlags) {
        self.navigation = flags;
    }

    fn tangent_frame(&self, _origin: Vec3) -> Option<Mat3> {
        self.tangent
    }
}

/// Disables camera navigation for the duration of a drag.
///
/// Locking twice keeps the first saved flags; unlocking without a lock does
/// nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct CameraLock {
    saved: Option<NavigationFlags>,
}

impl CameraLock {
    pub fn is_locked(&self) -> bool {
        self.saved.is_some()
    }

    pub fn lock<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        if self.saved.is_some() {
            return;
        }
        self.saved = Some(viewport.navigation());
        viewport.set_navigation(NavigationFlags::NONE);
    }

    pub fn unlock<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        if let Some(flags) = self.saved.take() {
            viewport.set_navigation(flags);
        }
    }
}
