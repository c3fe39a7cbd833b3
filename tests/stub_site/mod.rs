#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub static COVER_PNG: &[u8] = &[
    137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13, 73, 72, 68, 82, 0, 0, 0, 1, 0, 0, 0, 1, 8, 4, 0,
    0, 0, 181, 28, 12, 2, 0, 0, 0, 11, 73, 68, 65, 84, 120, 218, 99, 252, 255, 23, 0, 2, 3, 1, 128,
    110, 220, 25, 0, 0, 0, 0, 73, 69, 78, 68, 174, 66, 96, 130,
];

/// A small stand-in for tululu.org.
///
/// Books 1, 2, 4 and 7 exist (2 has no plain-text edition, 7 has a `/` in its title),
/// 3 redirects, 5 lacks a title heading and 6 fails with 500. Category `/l55/` has
/// three pages; page 3 lists nothing and page 4 fails with 500.
pub struct StubSite {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

enum Body {
    Html(String),
    Text(String),
    Png,
    Redirect,
    Status(u16),
}

impl StubSite {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start stub site server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                seen.lock().expect("lock request log").push(url.clone());

                let response = match route(&url) {
                    Body::Html(html) => tiny_http::Response::from_string(html)
                        .with_header(header("Content-Type", "text/html; charset=utf-8")),
                    Body::Text(text) => tiny_http::Response::from_string(text)
                        .with_header(header("Content-Type", "text/plain; charset=utf-8")),
                    Body::Png => tiny_http::Response::from_data(COVER_PNG.to_vec())
                        .with_header(header("Content-Type", "image/png")),
                    Body::Redirect => tiny_http::Response::from_string("")
                        .with_status_code(302)
                        .with_header(header("Location", "/")),
                    Body::Status(code) => {
                        tiny_http::Response::from_string("error").with_status_code(code)
                    }
                };

                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock request log").clone()
    }
}

impl Drop for StubSite {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn header(name: &str, value: &str) -> tiny_http::Header {
    tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("build header")
}

fn route(url: &str) -> Body {
    match url {
        "/b1/" => Body::Html(detail_page("Эта книга  ::  Иван Иванов", 1, true)),
        "/b2/" => Body::Html(detail_page("Без текста :: Пётр Петров", 2, false)),
        "/b3/" => Body::Redirect,
        "/b4/" => Body::Html(detail_page("Четвёртая :: Анна Смирнова", 4, true)),
        "/b5/" => Body::Html("<html><body><p>no heading</p></body></html>".to_owned()),
        "/b6/" => Body::Status(500),
        "/b7/" => Body::Html(detail_page("Да/Нет :: Автор", 7, true)),
        "/l55/" | "/l55/1" => Body::Html(listing_page(&[1, 2])),
        "/l55/2" => Body::Html(listing_page(&[3, 4])),
        "/l55/3" => Body::Html(listing_page(&[])),
        "/l55/4" => Body::Status(500),
        _ => {
            if let Some(id) = url.strip_prefix("/txt.php?id=") {
                Body::Text(format!("Текст книги {id}"))
            } else if url.starts_with("/shots/") {
                Body::Png
            } else {
                Body::Status(404)
            }
        }
    }
}

fn detail_page(heading: &str, id: u32, with_text: bool) -> String {
    let text_link = if with_text {
        format!(r#"<a href="/txt.php?id={id}" title="Книга {id} - скачать книгу txt">скачать txt</a>"#)
    } else {
        String::new()
    };

    format!(
        r#"<!doctype html>
<html>
  <body>
    <table class="tabs"><tr><td>
      <div id="content">
        <h1>{heading}</h1>
        <table class="d_book"><tr><td>
          <div class="bookimage"><a href="/b{id}/"><img src="/shots/{id}.jpg" alt="cover"></a></div>
        </td></tr></table>
        <span class="d_book"><b>Жанр книги:</b>
          <a href="/l55/" title="Научная фантастика - перейти к книгам этого жанра">Научная фантастика</a>,
          <a href="/l3/" title="Прочие приключения - перейти к книгам этого жанра">Прочие приключения</a>
        </span>
        <table class="d_book"><tr><td>{text_link}</td></tr></table>
        <div class="texts"><b>Читатель</b><br><span class="black">Комментарий к книге {id}</span></div>
      </div>
    </td></tr></table>
  </body>
</html>
"#
    )
}

fn listing_page(ids: &[u32]) -> String {
    let books = ids
        .iter()
        .map(|id| {
            format!(
                r#"<table class="d_book"><tr><td><a href="/b{id}/" title="Книга {id} - читать online, бесплатно"><img src="/shots/{id}.jpg"></a></td></tr></table>"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let pager = r#"<p class="center"><a class="npage" href="/l55/2/">2</a> <a class="npage" href="/l55/3/">3</a></p>"#;

    format!(
        r#"<!doctype html>
<html>
  <body>
    <div id="content">
      {books}
      {pager}
    </div>
  </body>
</html>
"#
    )
}
