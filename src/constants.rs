// Scene, lighting and DOM constants for the web front end.
// Kept free of imports so host-side tests can `include!` this file.

// Render surface
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

// Tone mapping (ACES filmic)
pub const TONE_MAPPING_EXPOSURE: f32 = 1.3;

// Lights
pub const AMBIENT_INTENSITY: f32 = 0.9;
pub const KEY_LIGHT_INTENSITY: f32 = 0.8;
pub const KEY_LIGHT_POSITION: [f32; 3] = [5.0, 20.0, 0.0];
pub const FILL_LIGHT_INTENSITY: f32 = 0.4;
pub const FILL_LIGHT_POSITION: [f32; 3] = [-8.0, 8.0, -8.0];

// Key light shadow camera (orthographic)
pub const SHADOW_MAP_SIZE: u32 = 4096;
pub const SHADOW_HALF_EXTENT: f32 = 4.0;
pub const SHADOW_NEAR: f32 = 5.0;
pub const SHADOW_FAR: f32 = 30.0;
pub const SHADOW_BIAS: f32 = -0.0003;
pub const SHADOW_NORMAL_BIAS: f32 = 0.03;

// Ground plane that only shows received shadow
pub const SHADOW_PLANE_SIZE: f32 = 50.0;
pub const SHADOW_PLANE_OPACITY: f32 = 0.18;

// Frame loop: clamp large gaps (tab in background) so the idle sway does not jump
pub const MAX_FRAME_DT_SEC: f32 = 0.1;

// DOM ids and classes
pub const CANVAS_ID_PREFIX: &str = "canvas-";
pub const CONTAINER_ID_PREFIX: &str = "model-viewer-";
pub const MODEL_PATH_ATTR: &str = "data-model-path";
pub const TWO_FINGER_PAN_ATTR: &str = "data-two-finger-pan";
pub const RECENTER_ON_ZOOM_OUT_ATTR: &str = "data-recenter-on-zoom-out";
pub const API_ORIGIN_ATTR: &str = "data-api-origin";
pub const VIEWER_CLASS: &str = "model-viewer";
pub const OVERLAY_CLASS: &str = "model-loading";
pub const SPINNER_CLASS: &str = "loading-spinner";
pub const PROGRESS_CLASS: &str = "loading-progress";
pub const ERROR_CLASS: &str = "loading-error";
pub const SLIDER_CLASS: &str = "pan-slider";
pub const SLIDER_TRACK_CLASS: &str = "pan-slider-track";
pub const SLIDER_THUMB_CLASS: &str = "pan-slider-thumb";

// Visitor-facing text
pub const LOAD_ERROR_TEXT: &str = "Fehler beim Laden";
pub const AR_LOADING_TEXT: &str = "AR-Ansicht wird geladen...";

// Carousel
pub const SLIDING_CLASS_MS: i32 = 350;

// CMS
pub const SUCCESS_MESSAGE_MS: i32 = 3000;
