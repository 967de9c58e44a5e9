/// Route prefix for the versioned API surface.
pub const API_PREFIX: &str = "/api/v0";

/// Cookie carrying the opaque client identifier.
pub const IDENTITY_COOKIE: &str = "uuid";

/// Multipart field name for the uploaded PDF.
pub const UPLOAD_FIELD: &str = "pdf";
