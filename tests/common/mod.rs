#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use zip::write::SimpleFileOptions;

use aeosgen::error::Error;
use aeosgen::{ArchiveFetcher, CompletionRequest, CompletionService, TemplateSource};

/// Template that unpacks to `plugin-template-main/`
pub fn test_template() -> TemplateSource
{   TemplateSource::new("acme", "plugin-template")
      .with_base_url("http://127.0.0.1:9")
}

/// Zip with every entry nested under `top/`
pub fn zip_bytes(top: &str, files: &[(&str, &str)]) -> Vec<u8>
{   let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.add_directory(format!("{}/", top), options).unwrap();
    for (name, contents) in files
    {   writer.start_file(format!("{}/{}", top, name), options).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// The minimal template used across the pipeline tests
pub fn minimal_template_zip() -> Vec<u8>
{   zip_bytes(
      "plugin-template-main",
      &[
        ("package.json", r#"{ "name": "template", "version": "1.0.0" }"#)
      , ("src/index.ts", "export default {};\n")
      , ("README.md", "# template\n")
      ]
    )
}

/// Sorted relative listing of everything below `root`
pub fn list_tree(root: &Path) -> Vec<String>
{   fn walk(base: &Path, dir: &Path, out: &mut Vec<String>)
    {   for entry in std::fs::read_dir(dir).unwrap()
        {   let path = entry.unwrap().path();
            out.push(
              path.strip_prefix(base).unwrap().display().to_string()
            );
            if path.is_dir()
            {   walk(base, &path, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

pub fn no_proxy_client() -> reqwest::Client
{   reqwest::Client::builder().no_proxy().build().unwrap()
}

// ===== Fakes =====

/// Writes canned archive bytes, or a truncated file followed by an error
pub struct StubFetcher
{   pub bytes: Vec<u8>
  , pub fail: Option<Error>
}

impl StubFetcher
{   pub fn serving(bytes: Vec<u8>) -> Self
    {   StubFetcher
        {   bytes
          , fail: None
        }
    }

    pub fn failing_after_partial_write(error: Error) -> Self
    {   StubFetcher
        {   bytes: b"PK\x03\x04trunc".to_vec()
          , fail: Some(error)
        }
    }
}

impl ArchiveFetcher for StubFetcher
{   async fn fetch(
      &self
    , _source: &TemplateSource
    , dest: &Path
    ) -> Result<(), Error>
    {   tokio::fs::write(dest, &self.bytes).await?;
        match &self.fail
        {   Some(e) => Err(e.clone())
          , None => Ok(())
        }
    }
}

/// Returns a fixed reply and records every request
pub struct StubCompletion
{   pub reply: Result<String, Error>
  , pub requests: Mutex<Vec<CompletionRequest>>
}

impl StubCompletion
{   pub fn replying(text: &str) -> Self
    {   StubCompletion
        {   reply: Ok(text.to_string())
          , requests: Mutex::new(Vec::new())
        }
    }

    pub fn failing(error: Error) -> Self
    {   StubCompletion
        {   reply: Err(error)
          , requests: Mutex::new(Vec::new())
        }
    }

    pub fn recorded(&self) -> Vec<CompletionRequest>
    {   self.requests.lock().unwrap().clone()
    }
}

impl CompletionService for StubCompletion
{   async fn complete(
      &self
    , request: &CompletionRequest
    ) -> Result<String, Error>
    {   self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

// ===== One-shot HTTP responder =====

pub struct Captured
{   pub head: String
  , pub body: Vec<u8>
}

/// Serve a single HTTP response on a random local port.
///
/// Returns the base URL and a handle yielding the captured request.
pub async fn serve_once(
  status: &str
, content_type: &str
, body: Vec<u8>
) -> (String, tokio::task::JoinHandle<Captured>)
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let status = status.to_string();
    let content_type = content_type.to_string();

    let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let captured = read_request(&mut socket).await;

      let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status, content_type, body.len()
      );
      // The client may hang up early on error statuses
      let _ = socket.write_all(head.as_bytes()).await;
      let _ = socket.write_all(&body).await;
      let _ = socket.shutdown().await;
      captured
    });

    (format!("http://{}", addr), handle)
}

/// Announce `declared_len` bytes of zip, send only `body`, then hang up
pub async fn serve_truncated(
  declared_len: usize
, body: Vec<u8>
) -> (String, tokio::task::JoinHandle<Captured>)
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let captured = read_request(&mut socket).await;

      let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        declared_len
      );
      let _ = socket.write_all(head.as_bytes()).await;
      let _ = socket.write_all(&body).await;
      let _ = socket.flush().await;
      drop(socket);
      captured
    });

    (format!("http://{}", addr), handle)
}

/// Base URL of a port nothing listens on
pub async fn refused_base_url() -> String
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Captured
{   let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop
    {   let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n")
        {   break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
      .lines()
      .filter_map(|line| line.split_once(':'))
      .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
      .and_then(|(_, v)| v.trim().parse::<usize>().ok())
      .unwrap_or(0);

    while buf.len() < header_end + content_length
    {   let n = socket.read(&mut chunk).await.unwrap();
        if n == 0
        {   break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Captured
    {   head
      , body: buf[header_end..].to_vec()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize>
{   haystack.windows(needle.len()).position(|w| w == needle)
}
