//! Echo implementation of `template.Greeter`.
//!
//! # Responsibilities
//! - Answer `SendGet` / `SendPost` with a fixed-format echo of the name
//! - Log the caller identity carried in `x-customer-header` metadata
//! - Serve the service on a caller-provided listener until shutdown
//!
//! The tower service below mirrors what `tonic-build` would emit for the
//! service, written out by hand since the messages are hand-derived too.

use std::convert::Infallible;
use std::future::{ready, Future, Ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use http::header::CONTENT_TYPE;
use http::HeaderValue;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::body::BoxBody;
use tonic::codec::ProstCodec;
use tonic::codegen::{empty_body, Body, BoxFuture, Service, StdError};
use tonic::server::{Grpc, NamedService, UnaryService};
use tonic::transport::Server;
use tonic::{Request, Response, Status};

use crate::rpc::contract::{TemplateRequest, TemplateResponse, CUSTOMER_HEADER, GREETER_SERVICE};

/// Counters exposed for assertions in tests.
#[derive(Debug, Default)]
struct EchoStats {
    served: AtomicUsize,
    customers: Mutex<Vec<String>>,
}

/// The echo backend. Cheap to clone; clones share statistics.
#[derive(Debug, Clone, Default)]
pub struct EchoGreeter {
    stats: Arc<EchoStats>,
}

impl EchoGreeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls answered so far.
    pub fn served(&self) -> usize {
        self.stats.served.load(Ordering::SeqCst)
    }

    /// Customer header values seen on `SendPost`, in arrival order.
    pub fn customers(&self) -> Vec<String> {
        self.stats
            .customers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn send_get(&self, request: Request<TemplateRequest>) -> Result<Response<TemplateResponse>, Status> {
        self.stats.served.fetch_add(1, Ordering::SeqCst);
        let name = request.into_inner().name;
        tracing::info!(name = %name, "SendGet");
        Ok(Response::new(TemplateResponse {
            message: format!("Received GET method {}", name),
        }))
    }

    pub fn send_post(&self, request: Request<TemplateRequest>) -> Result<Response<TemplateResponse>, Status> {
        self.stats.served.fetch_add(1, Ordering::SeqCst);
        let customer = request
            .metadata()
            .get_all(CUSTOMER_HEADER)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!(customer = %customer, "SendPost");
        self.stats
            .customers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(customer);

        let name = request.into_inner().name;
        Ok(Response::new(TemplateResponse {
            message: format!("Received POST method {}", name),
        }))
    }
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Get,
    Post,
}

struct EchoMethod {
    greeter: EchoGreeter,
    verb: Verb,
}

impl UnaryService<TemplateRequest> for EchoMethod {
    type Response = TemplateResponse;
    type Future = Ready<Result<Response<TemplateResponse>, Status>>;

    fn call(&mut self, request: Request<TemplateRequest>) -> Self::Future {
        ready(match self.verb {
            Verb::Get => self.greeter.send_get(request),
            Verb::Post => self.greeter.send_post(request),
        })
    }
}

/// Tower service routing gRPC paths to [`EchoGreeter`].
#[derive(Debug, Clone)]
pub struct GreeterServer {
    greeter: EchoGreeter,
}

impl GreeterServer {
    pub fn new(greeter: EchoGreeter) -> Self {
        Self { greeter }
    }
}

impl<B> Service<http::Request<B>> for GreeterServer
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let verb = match req.uri().path() {
            "/template.Greeter/SendGet" => Verb::Get,
            "/template.Greeter/SendPost" => Verb::Post,
            _ => return Box::pin(async { Ok(unimplemented_response()) }),
        };

        let method = EchoMethod {
            greeter: self.greeter.clone(),
            verb,
        };
        Box::pin(async move {
            let codec = ProstCodec::<TemplateResponse, TemplateRequest>::default();
            let mut grpc = Grpc::new(codec);
            Ok(grpc.unary(method, req).await)
        })
    }
}

impl NamedService for GreeterServer {
    const NAME: &'static str = GREETER_SERVICE;
}

fn unimplemented_response() -> http::Response<BoxBody> {
    let mut response = http::Response::new(empty_body());
    let headers = response.headers_mut();
    headers.insert("grpc-status", HeaderValue::from(tonic::Code::Unimplemented as i32));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/grpc"));
    response
}

/// Serve the echo backend on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    greeter: EchoGreeter,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()> + Send,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Echo backend listening");
    }
    Server::builder()
        .add_service(GreeterServer::new(greeter))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}
