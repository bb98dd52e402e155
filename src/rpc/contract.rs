//! Backend service contract.
//!
//! # Responsibilities
//! - Define the `template.Greeter` messages (protobuf wire + JSON shape)
//! - Describe unary methods with type-erased JSON ⇄ protobuf conversions
//! - Group methods and their HTTP aliases into a service contract
//!
//! # Design Decisions
//! - Messages are plain prost structs, no build-time code generation
//! - JSON decoding is strict: required fields must be present, unknown
//!   fields are rejected
//! - Conversions are monomorphized fn pointers so the gateway stays untyped

use bytes::Bytes;
use prost::Message;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fully qualified name of the demonstration service.
pub const GREETER_SERVICE: &str = "template.Greeter";

/// Metadata key carrying the caller identity.
pub const CUSTOMER_HEADER: &str = "x-customer-header";

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateResponse {
    #[prost(string, tag = "1")]
    pub message: String,
}

/// A backend reply that could not be turned into JSON.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("undecodable response message: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("response not representable as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

type JsonToWire = fn(&[u8]) -> Result<Bytes, serde_json::Error>;
type WireToJson = fn(Bytes) -> Result<Vec<u8>, ContractError>;

/// One unary method of a service.
#[derive(Clone)]
pub struct UnaryMethod {
    name: &'static str,
    path: String,
    request_from_json: JsonToWire,
    response_to_json: WireToJson,
}

impl UnaryMethod {
    pub fn new<Req, Resp>(service: &str, name: &'static str) -> Self
    where
        Req: Message + DeserializeOwned + 'static,
        Resp: Message + Default + Serialize + 'static,
    {
        Self {
            name,
            path: format!("/{}/{}", service, name),
            request_from_json: json_to_wire::<Req>,
            response_to_json: wire_to_json::<Resp>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// RPC path, e.g. `/template.Greeter/SendGet`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parse a JSON body into the encoded request message.
    pub fn request_from_json(&self, body: &[u8]) -> Result<Bytes, serde_json::Error> {
        (self.request_from_json)(body)
    }

    /// Decode a response message and render it as JSON.
    pub fn response_to_json(&self, payload: Bytes) -> Result<Vec<u8>, ContractError> {
        (self.response_to_json)(payload)
    }
}

impl std::fmt::Debug for UnaryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnaryMethod")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn json_to_wire<M>(body: &[u8]) -> Result<Bytes, serde_json::Error>
where
    M: Message + DeserializeOwned,
{
    let message: M = serde_json::from_slice(body)?;
    Ok(Bytes::from(message.encode_to_vec()))
}

fn wire_to_json<M>(payload: Bytes) -> Result<Vec<u8>, ContractError>
where
    M: Message + Default + Serialize,
{
    let message = M::decode(payload)?;
    Ok(serde_json::to_vec(&message)?)
}

/// A service name plus its unary methods and short HTTP aliases.
#[derive(Debug, Clone)]
pub struct ServiceContract {
    name: &'static str,
    methods: Vec<UnaryMethod>,
    aliases: Vec<(&'static str, &'static str)>,
}

impl ServiceContract {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            methods: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn method<Req, Resp>(mut self, name: &'static str) -> Self
    where
        Req: Message + DeserializeOwned + 'static,
        Resp: Message + Default + Serialize + 'static,
    {
        self.methods.push(UnaryMethod::new::<Req, Resp>(self.name, name));
        self
    }

    /// Expose `method` under an additional short path segment.
    pub fn alias(mut self, alias: &'static str, method: &'static str) -> Self {
        self.aliases.push((alias, method));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn methods(&self) -> &[UnaryMethod] {
        &self.methods
    }

    pub fn aliases(&self) -> &[(&'static str, &'static str)] {
        &self.aliases
    }
}

/// The `template.Greeter` contract served by the echo backend.
pub fn greeter_contract() -> ServiceContract {
    ServiceContract::new(GREETER_SERVICE)
        .method::<TemplateRequest, TemplateResponse>("SendGet")
        .method::<TemplateRequest, TemplateResponse>("SendPost")
        .alias("get", "SendGet")
        .alias("post", "SendPost")
}
