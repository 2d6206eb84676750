//! Declarative table of the supported API operations.
//!
//! Every operation is one [`EndpointDescriptor`]: method, path template,
//! query mapping and body kind. [`EndpointDescriptor::resolve`] turns a
//! descriptor plus call arguments into an [`ApiRequest`] for the dispatcher.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::time::Duration;

use crate::dispatch::ApiRequest;
use crate::errors::{DhlError, DhlResult};
use crate::transport::Method;

/// Characters left as-is inside a path segment (RFC 3986 unreserved).
const PATH_SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Fixed page size for parcel shop searches.
pub const PARCEL_SHOP_LIMIT: &str = "10";

/// Supported API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Delivery time windows for a postal code.
    TimeWindows,
    /// Schedule a pickup.
    CreatePickupRequest,
    /// Create a shipping label.
    CreateLabel,
    /// Track one or more shipments.
    TrackAndTrace,
    /// Search parcel shops near a postal code.
    FindParcelShopLocations,
    /// Look up a single parcel shop.
    FindParcelShop,
    /// Retrieve an existing label.
    FindLabel,
    /// Proof of delivery for a piece.
    Pieces,
}

impl Operation {
    /// All operations, in table order.
    pub const ALL: [Operation; 8] = [
        Operation::TimeWindows,
        Operation::CreatePickupRequest,
        Operation::CreateLabel,
        Operation::TrackAndTrace,
        Operation::FindParcelShopLocations,
        Operation::FindParcelShop,
        Operation::FindLabel,
        Operation::Pieces,
    ];

    /// Returns the descriptor for this operation.
    pub fn descriptor(self) -> &'static EndpointDescriptor {
        match self {
            Operation::TimeWindows => &TIME_WINDOWS,
            Operation::CreatePickupRequest => &CREATE_PICKUP_REQUEST,
            Operation::CreateLabel => &CREATE_LABEL,
            Operation::TrackAndTrace => &TRACK_AND_TRACE,
            Operation::FindParcelShopLocations => &FIND_PARCEL_SHOP_LOCATIONS,
            Operation::FindParcelShop => &FIND_PARCEL_SHOP,
            Operation::FindLabel => &FIND_LABEL,
            Operation::Pieces => &PIECES,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

/// Source of a query parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryValue {
    /// Taken from the named call argument.
    Arg(&'static str),
    /// Always the same value.
    Fixed(&'static str),
}

/// Whether an operation sends a JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// No body.
    None,
    /// Caller-supplied JSON object.
    Json,
}

/// Declarative description of one operation.
#[derive(Debug)]
pub struct EndpointDescriptor {
    /// Wire-facing operation name, used in errors and logs.
    pub name: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Path template with `{arg}` placeholders.
    pub path: &'static str,
    /// Placeholders whose values are lowercased before substitution.
    pub lowercase: &'static [&'static str],
    /// Query parameters as (wire name, value source), in wire order.
    pub query: &'static [(&'static str, QueryValue)],
    /// Body kind.
    pub body: BodyKind,
    /// Follows "Could not" in error messages.
    pub description: &'static str,
}

static TIME_WINDOWS: EndpointDescriptor = EndpointDescriptor {
    name: "timeWindows",
    method: Method::Get,
    path: "/time-windows",
    lowercase: &[],
    query: &[
        ("countryCode", QueryValue::Arg("countryCode")),
        ("postalCode", QueryValue::Arg("postalCode")),
    ],
    body: BodyKind::None,
    description: "retrieve time window information",
};

static CREATE_PICKUP_REQUEST: EndpointDescriptor = EndpointDescriptor {
    name: "createPickupRequest",
    method: Method::Post,
    path: "/pickup-requests",
    lowercase: &[],
    query: &[],
    body: BodyKind::Json,
    description: "create a pickup request",
};

static CREATE_LABEL: EndpointDescriptor = EndpointDescriptor {
    name: "createLabel",
    method: Method::Post,
    path: "/labels",
    lowercase: &[],
    query: &[],
    body: BodyKind::Json,
    description: "create a label",
};

static TRACK_AND_TRACE: EndpointDescriptor = EndpointDescriptor {
    name: "trackAndTrace",
    method: Method::Get,
    path: "/track-trace",
    lowercase: &[],
    query: &[("key", QueryValue::Arg("key"))],
    body: BodyKind::None,
    description: "retrieve track trace information",
};

static FIND_PARCEL_SHOP_LOCATIONS: EndpointDescriptor = EndpointDescriptor {
    name: "findParcelShopLocations",
    method: Method::Get,
    path: "/parcel-shop-locations/{country}",
    lowercase: &["country"],
    query: &[
        ("limit", QueryValue::Fixed(PARCEL_SHOP_LIMIT)),
        ("zipCode", QueryValue::Arg("zipCode")),
    ],
    body: BodyKind::None,
    description: "retrieve parcel shop locations",
};

static FIND_PARCEL_SHOP: EndpointDescriptor = EndpointDescriptor {
    name: "findParcelShop",
    method: Method::Get,
    path: "/parcel-shop-locations/{country}/{id}",
    lowercase: &["country"],
    query: &[],
    body: BodyKind::None,
    description: "retrieve parcel shop information",
};

static FIND_LABEL: EndpointDescriptor = EndpointDescriptor {
    name: "findLabel",
    method: Method::Get,
    path: "/labels/{labelId}",
    lowercase: &[],
    query: &[],
    body: BodyKind::None,
    description: "retrieve label information",
};

static PIECES: EndpointDescriptor = EndpointDescriptor {
    name: "pieces",
    method: Method::Get,
    path: "/pieces/{pieceId}/pod",
    lowercase: &[],
    query: &[("receiver.address.postalCode", QueryValue::Arg("zipCode"))],
    body: BodyKind::None,
    description: "retrieve pieces information",
};

/// Named arguments for one call.
#[derive(Debug, Default, Clone)]
pub struct EndpointArgs<'a> {
    values: Vec<(&'static str, &'a str)>,
    body: Option<Value>,
}

impl<'a> EndpointArgs<'a> {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named argument.
    pub fn arg(mut self, name: &'static str, value: &'a str) -> Self {
        self.values.push((name, value));
        self
    }

    /// Sets the JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn get(&self, name: &str) -> Option<&'a str> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

impl EndpointDescriptor {
    /// Builds the request for this operation.
    ///
    /// # Errors
    ///
    /// Returns [`DhlError::InvalidParameter`] when a path argument is missing
    /// or blank, a query argument is missing, or a JSON body is missing.
    pub fn resolve(&self, args: EndpointArgs<'_>, timeout: Duration) -> DhlResult<ApiRequest> {
        let path = self.render_path(&args)?;
        let mut request =
            ApiRequest::new(self.method, path, timeout).operation(self.name, self.description);

        for (wire_name, source) in self.query {
            let value = match source {
                QueryValue::Fixed(value) => *value,
                QueryValue::Arg(name) => args.get(name).ok_or_else(|| {
                    DhlError::invalid_parameter(*name, "query argument is required")
                })?,
            };
            request = request.query(*wire_name, value);
        }

        match (self.body, args.body) {
            (BodyKind::Json, Some(body)) => Ok(request.json(body)),
            (BodyKind::Json, None) => Err(DhlError::invalid_parameter(
                "body",
                "request body is required",
            )),
            (BodyKind::None, _) => Ok(request),
        }
    }

    fn render_path(&self, args: &EndpointArgs<'_>) -> DhlResult<String> {
        let mut rendered = String::with_capacity(self.path.len() + 16);
        let mut rest = self.path;

        while let Some(start) = rest.find('{') {
            rendered.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or_else(|| DhlError::Configuration {
                message: format!("Unterminated placeholder in path template {}", self.path),
            })?;
            let name = &after[..end];

            let value = args
                .values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(key, value)| (*key, value.trim()));
            let (key, value) = match value {
                Some((key, value)) if !value.is_empty() => (key, value),
                Some((key, _)) => {
                    return Err(DhlError::invalid_parameter(key, "must not be empty"))
                }
                None => {
                    return Err(DhlError::Configuration {
                        message: format!("Missing path argument {} for {}", name, self.name),
                    })
                }
            };

            let value = if self.lowercase.contains(&key) {
                value.to_lowercase()
            } else {
                value.to_string()
            };
            rendered.push_str(&utf8_percent_encode(&value, PATH_SEGMENT_SET).to_string());
            rest = &after[end + 1..];
        }

        rendered.push_str(rest);
        Ok(rendered)
    }
}

/// Comma-joins track-and-trace references into the `key` query value.
pub fn join_references<S: AsRef<str>>(references: &[S]) -> String {
    references
        .iter()
        .map(|reference| reference.as_ref().trim())
        .filter(|reference| !reference.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
