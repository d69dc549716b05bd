use std::{convert::Infallible, net::SocketAddr};

use bytes::Bytes;
use futures_util::StreamExt;
use http_body_util::{BodyStream, Full};
use hyper::{body::Incoming, header::CONTENT_TYPE, Method, Request, Response, StatusCode};
// Import the formbound types.
use formbound::{save_files, FormOptions, FormReader};

const PAGE: &str = r#"
    <h3>formbound upload demo</h3>
    <form action="/upload" enctype="multipart/form-data" method="post">
      <div>Text field title: <input type="text" name="title" /></div>
      <div>File: <input type="file" name="multiple" multiple/></div>
      <input type="submit" value="Upload" />
    </form>
"#;

// A handler for incoming requests.
async fn handle(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.method() == Method::POST && req.uri().path() == "/upload" {
        return Ok(upload(req).await);
    }

    Ok(Response::builder()
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Full::from(PAGE))
        .unwrap())
}

// Decode the multipart body, store the file fields, and report what arrived.
async fn upload(req: Request<Incoming>) -> Response<Full<Bytes>> {
    // Extract the `multipart/form-data` boundary from the headers.
    let boundary = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .and_then(|ct| formbound::parse_boundary(ct).ok());

    let boundary = match boundary {
        Some(boundary) => boundary,
        None => {
            return Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .body(Full::from("missing multipart boundary"))
                .unwrap();
        }
    };

    let options = FormOptions::new()
        .multiple(true)
        .upload_dir("./upload")
        .keep_extension(true);

    // Convert the body into a stream of data frames.
    let body_stream = BodyStream::new(req.into_body())
        .filter_map(|result| async move { result.map(|frame| frame.into_data().ok()).transpose() });

    match FormReader::with_options(body_stream, boundary, options.clone())
        .read_form()
        .await
    {
        Ok(form) => match save_files(&form, &options) {
            Ok(saved) => {
                let mut lines = Vec::new();
                for (name, value) in form.iter() {
                    for info in value.iter() {
                        match info.text() {
                            Some(text) => lines.push(format!("{}: {:?}", name, text)),
                            None => lines.push(format!(
                                "{}: file {:?} ({} bytes)",
                                name,
                                info.file_name().unwrap_or(""),
                                info.bytes().map(|bytes| bytes.len()).unwrap_or(0)
                            )),
                        }
                    }
                }
                lines.push(format!("{} file(s) stored under ./upload", saved.len()));
                Response::new(Full::from(lines.join("\n")))
            }
            Err(err) => Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::from(format!("failed to store uploads: {}", err)))
                .unwrap(),
        },
        // Size violations become 413, unusable input 400, transport errors 500.
        Err(err) => Response::builder()
            .status(err.status_hint())
            .body(Full::from(err.to_string()))
            .unwrap(),
    }
}

#[tokio::main]
async fn main() {
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    println!("Server running at: http://{}", addr);

    let service = hyper::service::service_fn(handle);

    loop {
        let (socket, _remote_addr) = listener.accept().await.unwrap();
        let socket = hyper_util::rt::TokioIo::new(socket);
        tokio::spawn(async move {
            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(socket, service)
                .await
            {
                eprintln!("server error: {}", e);
            }
        });
    }
}
