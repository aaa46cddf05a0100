use serde::Serialize;

/// Standard `{ "data": ... }` envelope for read and back-office endpoints.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "ok": true }` returned by the public submission endpoints.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Public URLs of uploaded images, in upload order.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}
