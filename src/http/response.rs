/// What came back from the wire for one request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub duration_ms: u64,
    pub size_bytes: usize,
    pub body: String,
}
