//! End-to-end rendering through the public API

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use jurat_core::RawClientRecord;
use jurat_pdf::test_utils::{n400_template, page_markers};
use jurat_pdf::PdfForm;
use jurat_render::{
    select_renderer, select_renderer_with_transport, DocumentRenderer, FillTransport,
    LocalRenderer, MemoryTemplateLoader, PacketAssembler, RenderError, RenderResult, Settings,
    TemplateLoader, TransportResponse,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Counts template loads, serving the N-400 fixture
#[derive(Default)]
struct CountingLoader {
    loads: AtomicUsize,
}

#[async_trait]
impl TemplateLoader for CountingLoader {
    fn location(&self) -> String {
        "counting".to_string()
    }

    async fn load(&self, _form_id: &str) -> RenderResult<Vec<u8>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(n400_template())
    }
}

struct FailingService;

#[async_trait]
impl FillTransport for FailingService {
    async fn post_json(&self, _url: &str, _body: Vec<u8>) -> Result<TransportResponse, String> {
        Ok(TransportResponse {
            status: 500,
            body: b"internal error".to_vec(),
        })
    }
}

fn sample() -> RawClientRecord {
    serde_json::from_str(
        r#"{
            "id": "CL-481516",
            "firstName": "Valeria",
            "middleName": "Isabel",
            "lastName": "Gomez",
            "alienNumber": "A208945671",
            "dateOfBirth": "1992-03-11",
            "addressLine1": "4100 W Irving Park Rd",
            "city": "Chicago",
            "state": "IL",
            "zipCode": "60641",
            "country": "United States"
        }"#,
    )
    .unwrap()
}

/// Serve every request on a local port with an empty `status` response
async fn serve_status(status: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    format!("http://{}", addr)
}

/// Read one request, headers and body
async fn read_request(stream: &mut TcpStream) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        request.extend_from_slice(&chunk[..n]);
        let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if request.len() >= end + 4 + body_len {
            return;
        }
    }
}

#[tokio::test]
async fn test_remote_failure_never_falls_back_to_local() {
    let settings = Settings::from_toml_str("[render]\nservice_url = \"http://render.local\"\n")
        .unwrap();
    let loader = Arc::new(CountingLoader::default());
    let renderer =
        select_renderer_with_transport(&settings, loader.clone(), Arc::new(FailingService));
    assert_eq!(renderer.name(), "remote");

    let err = renderer.render(&sample(), "N-400").await.unwrap_err();
    assert!(matches!(
        err,
        RenderError::RemoteServiceFailure { status: 500, .. }
    ));

    let err = PacketAssembler::new(renderer.as_ref())
        .assemble(&["N-400", "I-130"], &sample())
        .await
        .unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);

    // Without a service the same loader is used
    let local = select_renderer_with_transport(
        &Settings::default(),
        loader.clone(),
        Arc::new(FailingService),
    );
    local.render(&sample(), "N-400").await.unwrap();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_service_error_status_is_reported() {
    let url = serve_status("502 Bad Gateway").await;
    let settings = Settings::from_toml_str(&format!(
        "[render]\nservice_url = \"{}\"\n[remote]\ntimeout_secs = 5\n",
        url
    ))
    .unwrap();
    let loader = Arc::new(CountingLoader::default());
    let renderer = select_renderer(&settings, loader.clone()).unwrap();

    let err = renderer.render(&sample(), "N-400").await.unwrap_err();
    assert_eq!(err.status(), 502);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
}

#[cfg(feature = "remote")]
#[tokio::test]
async fn test_http_template_loader_reports_status() {
    let url = serve_status("503 Service Unavailable").await;
    let loader =
        jurat_render::HttpTemplateLoader::new(url, std::time::Duration::from_secs(5)).unwrap();

    let err = loader.load("n-400").await.unwrap_err();
    assert!(matches!(
        err,
        RenderError::TemplateUnavailable { ref form_id, status: 503 } if form_id == "N-400"
    ));
    assert_eq!(err.status(), 503);
}

#[tokio::test]
async fn test_configured_service_selects_remote() {
    let settings = Settings::from_toml_str(
        "[render]\nservice_url = \"http://127.0.0.1:9\"\n[remote]\ntimeout_secs = 2\n",
    )
    .unwrap();
    let loader = Arc::new(CountingLoader::default());
    let renderer = select_renderer(&settings, loader.clone()).unwrap();
    assert_eq!(renderer.name(), "remote");

    let err = renderer.render(&sample(), "N-400").await.unwrap_err();
    assert!(matches!(err, RenderError::RemoteServiceFailure { status: 0, .. }));
    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_local_packet() {
    let loader = Arc::new(MemoryTemplateLoader::new().with_template("N-400", n400_template()));
    let renderer = LocalRenderer::new(loader);

    let packet = PacketAssembler::new(&renderer)
        .assemble(&["N-400", "I-130", "I-90"], &sample())
        .await
        .unwrap();

    assert_eq!(packet.page_count, 5);
    let markers = page_markers(&packet.bytes);
    assert_eq!(markers.len(), 5);
    assert!(markers[..3].iter().all(|m| m.starts_with("N-400 page")));
    assert_eq!(markers[3], "I-130 Petition for Alien Relative");
    assert_eq!(markers[4], "I-90 Application to Replace Permanent Resident Card");

    let form = PdfForm::load(&packet.bytes).unwrap();
    assert_eq!(
        form.text_value("form1[0].#subform[1].Part2Line4a_GivenName[0]")
            .as_deref(),
        Some("VALERIA")
    );
}

#[tokio::test]
async fn test_local_renderer_from_default_settings_reads_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("N-400.pdf"), n400_template()).unwrap();

    let mut settings = Settings::default();
    settings.render.template_dir = dir.path().to_path_buf();
    let loader = jurat_render::template_loader(&settings).unwrap();
    let renderer = select_renderer(&settings, loader).unwrap();

    let doc = renderer.render(&sample(), "N-400").await.unwrap();
    assert_eq!(doc.file_name, "CL-481516-N-400.pdf");
    let form = PdfForm::load(&doc.bytes).unwrap();
    assert_eq!(
        form.text_value("form1[0].#subform[2].P4_Line1_StreetName[0]")
            .as_deref(),
        Some("W IRVING PARK RD")
    );
}
