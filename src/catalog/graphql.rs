//! Shopify Admin GraphQL catalog client

use super::{Catalog, CatalogRecord, LocationDirectory, QuantityChange, ShopProfile, UserError};
use crate::domain::{InventoryItemRef, Location, VariantId};
use crate::error::CatalogError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const VARIANT_GID_PREFIX: &str = "gid://shopify/ProductVariant/";
const LOCATION_GID_PREFIX: &str = "gid://shopify/Location/";
const MAX_ERROR_BODY_CHARS: usize = 200;

const LOOKUP_QUERY: &str = r#"
query getVariants($ids: [ID!]!, $locationId: ID!) {
  nodes(ids: $ids) {
    ... on ProductVariant {
      id
      inventoryItem {
        id
        tracked
        inventoryLevel(locationId: $locationId) {
          quantities(names: ["available"]) {
            name
            quantity
          }
        }
      }
    }
  }
}"#;

const SET_ON_HAND_MUTATION: &str = r#"
mutation inventorySetOnHandQuantities($input: InventorySetOnHandQuantitiesInput!) {
  inventorySetOnHandQuantities(input: $input) {
    userErrors {
      field
      message
    }
  }
}"#;

const LOCATIONS_QUERY: &str = r#"
query {
  locations(first: 50) {
    edges {
      node {
        id
        name
      }
    }
  }
}"#;

const SHOP_EMAIL_QUERY: &str = r#"
query {
  shop {
    email
    contactEmail
  }
}"#;

const LOCATION_QUERY: &str = r#"
query getLocation($id: ID!) {
  location(id: $id) {
    name
  }
}"#;

/// Catalog backed by the Admin GraphQL API of one shop.
pub struct GraphqlCatalog {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl GraphqlCatalog {
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stock-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint: endpoint.into(), access_token: access_token.into() })
    }

    /// Admin API endpoint for a shop domain, e.g. `example.myshopify.com`.
    pub fn endpoint_for_shop(shop: &str, api_version: &str) -> String {
        let host = shop.trim().trim_start_matches("https://").trim_end_matches('/');
        format!("https://{host}/admin/api/{api_version}/graphql.json")
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, CatalogError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Http {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let envelope: GraphqlResponse<T> =
            response.json().await.map_err(|e| CatalogError::Decode(e.to_string()))?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            return Err(CatalogError::Graphql(errors.into_iter().map(GraphqlError::describe).collect()));
        }

        envelope.data.ok_or_else(|| CatalogError::Decode("response carried no data".to_string()))
    }
}

#[async_trait]
impl Catalog for GraphqlCatalog {
    async fn lookup(
        &self,
        ids: &[VariantId],
        location: &Location,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let gids: Vec<String> =
            ids.iter().map(|id| format!("{VARIANT_GID_PREFIX}{id}")).collect();
        let data: NodesData = self
            .execute(LOOKUP_QUERY, json!({ "ids": gids, "locationId": location_gid(&location.id) }))
            .await?;

        Ok(data.nodes.into_iter().flatten().filter_map(VariantNode::into_record).collect())
    }

    async fn set_on_hand(
        &self,
        changes: &[QuantityChange],
        location: &Location,
        reason: &str,
    ) -> Result<Vec<UserError>, CatalogError> {
        let location_id = location_gid(&location.id);
        let set_quantities: Vec<Value> = changes
            .iter()
            .map(|change| {
                json!({
                    "inventoryItemId": change.inventory_item.as_str(),
                    "locationId": location_id,
                    "quantity": change.quantity,
                })
            })
            .collect();

        let data: SetOnHandData = self
            .execute(
                SET_ON_HAND_MUTATION,
                json!({ "input": { "reason": reason, "setQuantities": set_quantities } }),
            )
            .await?;

        Ok(data.inventory_set_on_hand_quantities.map(|p| p.user_errors).unwrap_or_default())
    }
}

#[async_trait]
impl LocationDirectory for GraphqlCatalog {
    async fn locations(&self) -> Result<Vec<Location>, CatalogError> {
        let data: LocationsData = self.execute(LOCATIONS_QUERY, json!({})).await?;
        Ok(data
            .locations
            .edges
            .into_iter()
            .map(|edge| Location::new(edge.node.id, edge.node.name))
            .collect())
    }

    async fn location_name(&self, id: &str) -> Result<Option<String>, CatalogError> {
        let data: LocationData =
            self.execute(LOCATION_QUERY, json!({ "id": location_gid(id) })).await?;
        Ok(data.location.map(|l| l.name))
    }
}

#[async_trait]
impl ShopProfile for GraphqlCatalog {
    async fn owner_email(&self) -> Result<Option<String>, CatalogError> {
        let data: ShopData = self.execute(SHOP_EMAIL_QUERY, json!({})).await?;
        Ok(data.shop.and_then(ShopNode::email))
    }
}

/// Accept either a bare numeric location id or a full gid.
pub fn location_gid(id: &str) -> String {
    if id.starts_with("gid://") {
        id.to_string()
    } else {
        format!("{LOCATION_GID_PREFIX}{id}")
    }
}

fn transport_error(err: reqwest::Error) -> CatalogError {
    match err.status() {
        Some(status) => CatalogError::Http { status: status.as_u16(), message: err.to_string() },
        None => CatalogError::Transport(err.to_string()),
    }
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphqlErrorExtensions>,
}

#[derive(Deserialize)]
struct GraphqlErrorExtensions {
    code: Option<String>,
}

impl GraphqlError {
    fn describe(self) -> String {
        match self.extensions.and_then(|ext| ext.code) {
            Some(code) if !self.message.contains(&code) => format!("{} ({code})", self.message),
            _ => self.message,
        }
    }
}

#[derive(Deserialize)]
struct NodesData {
    nodes: Vec<Option<VariantNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    id: Option<String>,
    inventory_item: Option<InventoryItemNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryItemNode {
    id: Option<String>,
    tracked: Option<bool>,
    inventory_level: Option<InventoryLevelNode>,
}

#[derive(Deserialize)]
struct InventoryLevelNode {
    #[serde(default)]
    quantities: Vec<QuantityNode>,
}

#[derive(Deserialize)]
struct QuantityNode {
    name: String,
    quantity: i64,
}

impl VariantNode {
    fn into_record(self) -> Option<CatalogRecord> {
        // Non-variant nodes come back as empty objects.
        let gid = self.id?;
        let variant_id = VariantId::parse(gid.rsplit('/').next().unwrap_or_default())?;
        let item = self.inventory_item;
        let level = item.as_ref().and_then(|i| i.inventory_level.as_ref());

        Some(CatalogRecord {
            variant_id,
            tracked: item.as_ref().and_then(|i| i.tracked).unwrap_or(false),
            inventory_item: item.as_ref().and_then(|i| i.id.clone()).map(InventoryItemRef::new),
            available: level.and_then(|l| {
                l.quantities.iter().find(|q| q.name == "available").map(|q| q.quantity)
            }),
            has_inventory_level: level.is_some(),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetOnHandData {
    inventory_set_on_hand_quantities: Option<SetOnHandPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetOnHandPayload {
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
struct LocationsData {
    locations: LocationConnection,
}

#[derive(Deserialize)]
struct LocationConnection {
    edges: Vec<LocationEdge>,
}

#[derive(Deserialize)]
struct LocationEdge {
    node: LocationNode,
}

#[derive(Deserialize)]
struct LocationNode {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ShopData {
    shop: Option<ShopNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShopNode {
    email: Option<String>,
    contact_email: Option<String>,
}

impl ShopNode {
    fn email(self) -> Option<String> {
        let present = |value: &String| !value.trim().is_empty();
        self.email.filter(present).or(self.contact_email.filter(present))
    }
}

#[derive(Deserialize)]
struct LocationData {
    location: Option<LocationNameNode>,
}

#[derive(Deserialize)]
struct LocationNameNode {
    name: String,
}
