//! Local stand-in for the catalog site, served by tiny_http on an ephemeral port.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tululu_scrape::{Endpoints, PoliteClient};

#[derive(Clone, Debug)]
pub struct Reply {
    status: u16,
    body: Vec<u8>,
    location: Option<String>,
}

impl Reply {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into().into_bytes(),
            location: None,
        }
    }

    pub fn bytes(body: &[u8]) -> Self {
        Self {
            status: 200,
            body: body.to_vec(),
            location: None,
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            body: Vec::new(),
            location: Some(location.to_string()),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: b"error".to_vec(),
            location: None,
        }
    }
}

/// Routes are keyed by the request target as received, path plus query (`/txt.php?id=3`).
/// Unknown targets answer 404.
pub struct StubServer {
    pub base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
    shutdown: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StubServer {
    pub fn start(routes: HashMap<String, Reply>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
        let base_url = format!("http://{}", server.server_addr());
        let hits = Arc::new(Mutex::new(Vec::new()));
        let (shutdown, shutdown_rx) = mpsc::channel::<()>();

        let thread_hits = Arc::clone(&hits);
        let handle = thread::spawn(move || loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };
            let target = request.url().to_string();
            thread_hits.lock().expect("hits lock").push(target.clone());

            let reply = routes
                .get(&target)
                .cloned()
                .unwrap_or_else(|| Reply::status(404));
            let mut response =
                tiny_http::Response::from_data(reply.body).with_status_code(reply.status);
            if let Some(location) = reply.location {
                let header = tiny_http::Header::from_bytes(&b"Location"[..], location.as_bytes())
                    .expect("build header");
                response.add_header(header);
            }
            let _ = request.respond(response);
        });

        Self {
            base_url,
            hits,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(
            &format!("{}/l55/", self.base_url),
            &format!("{}/", self.base_url),
            &format!("{}/txt.php", self.base_url),
        )
        .expect("stub endpoints")
    }

    /// Request targets in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().expect("hits lock").clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn client() -> PoliteClient {
    PoliteClient::builder()
        .delay_secs(0)
        .timeout_secs(5)
        .build()
        .expect("build client")
}

/// Catalog page with one card per id and, optionally, pagination links up to `last_page`.
pub fn catalog_page(ids: &[u32], last_page: Option<u32>) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<table class="d_book"><tr><td><div class="bookimage"><a href="/b{id}/"><img src="/images/nopic.gif"></a></div></td></tr>
<tr><td><a href="/b{id}/">Book {id}</a></td></tr></table>"#
            )
        })
        .collect();
    let pagination: String = match last_page {
        Some(last) => (2..=last)
            .map(|p| format!(r#"<a class="npage" href="/l55/{p}/">{p}</a>"#))
            .collect(),
        None => String::new(),
    };
    format!(
        "<html><body><div id=\"content\">{cards}<p class=\"center\">{pagination}</p></div></body></html>"
    )
}

/// Detail page for book `id`: heading `Author id :: Title id`, one genre, one comment,
/// cover at `/shots/<id>.jpg`.
pub fn detail_page(id: u32) -> String {
    format!(
        r#"<html><body><div id="content">
<h1>Author {id} &nbsp;::&nbsp; Title {id}</h1>
<table class="d_book"><tr><td><div class="bookimage"><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></div></td></tr></table>
<span class="d_book"><b>Жанр книги:</b> <a href="/l55/">Научная фантастика</a></span>
<div class="texts"><b>Reader</b><br><span class="black">Comment on {id}</span></div>
</div></body></html>"#
    )
}

/// Routes for a complete, healthy book: detail page, text and cover.
pub fn book_routes(routes: &mut HashMap<String, Reply>, id: u32) {
    routes.insert(format!("/b{id}/"), Reply::html(detail_page(id)));
    routes.insert(
        format!("/txt.php?id={id}"),
        Reply::bytes(format!("Text of book {id}").as_bytes()),
    );
    routes.insert(format!("/shots/{id}.jpg"), Reply::bytes(&cover_bytes(id)));
}

pub fn cover_bytes(id: u32) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(&id.to_be_bytes());
    bytes
}
