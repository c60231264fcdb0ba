//! Shared fixtures for unit tests

use std::sync::Arc;

use strata_registry::{Catalog, FunctionRegistry, StaticSource};
use strata_transport::Transport;

use crate::{Client, ProxyClass};

pub(crate) const CATALOG: &str = r#"{
    "Image.constant": {"returns": "Image", "args": [{"name": "value", "type": "Object"}]},
    "Image.load": {"returns": "Image", "args": [
        {"name": "id", "type": "String"},
        {"name": "version", "type": "Long", "optional": true}
    ]},
    "Image.add": {"returns": "Image", "args": [
        {"name": "image1", "type": "Image"},
        {"name": "image2", "type": "Image"}
    ]},
    "ImageCollection.load": {"returns": "ImageCollection", "args": [{"name": "id", "type": "String"}]},
    "ImageCollection.fromImages": {"returns": "ImageCollection", "args": [{"name": "images", "type": "List"}]},
    "Collection": {"returns": "FeatureCollection", "args": [{"name": "features", "type": "List"}]},
    "Collection.loadTable": {"returns": "FeatureCollection", "args": [{"name": "tableId", "type": "Object"}]},
    "Collection.geometry": {"returns": "Geometry", "args": [
        {"name": "collection", "type": "FeatureCollection"},
        {"name": "maxError", "type": "ErrorMargin", "optional": true}
    ]},
    "Feature": {"returns": "Feature", "args": [
        {"name": "geometry", "type": "Geometry"},
        {"name": "metadata", "type": "Dictionary", "optional": true}
    ]},
    "ErrorMargin": {"returns": "ErrorMargin", "args": [
        {"name": "value", "type": "Float"},
        {"name": "unit", "type": "String", "optional": true}
    ]},
    "Date": {"returns": "Date", "args": [
        {"name": "value", "type": "Object"},
        {"name": "tz", "type": "String", "optional": true}
    ]},
    "Filter.eq": {"returns": "Filter", "args": [
        {"name": "name", "type": "String"},
        {"name": "value", "type": "Object"}
    ]},
    "Element.set": {"returns": "Element", "args": [
        {"name": "object", "type": "Element"},
        {"name": "key", "type": "String"},
        {"name": "value", "type": "Object"}
    ]},
    "Reducer.mean": {"returns": "Reducer", "args": []},
    "Reducer.combine": {"returns": "Reducer", "args": [
        {"name": "reducer1", "type": "Reducer"},
        {"name": "reducer2", "type": "Reducer"}
    ]},
    "Projection": {"returns": "Projection", "args": [{"name": "crs", "type": "Object"}]},
    "Projection.wkt": {"returns": "String", "args": [{"name": "proj", "type": "Projection"}]},
    "List.sequence": {"returns": "List<Number>", "args": [{"name": "start", "type": "Float"}]},
    "Landsat.simpleComposite": {"returns": "Image", "args": [
        {"name": "collection", "type": "ImageCollection"},
        {"name": "percentile", "type": "Float", "optional": true}
    ], "description": "Computes a simple composite."},
    "Terrain.slope": {"returns": "Image", "args": [{"name": "input", "type": "Image"}]},
    "Debug.trace": {"returns": "Object", "args": [{"name": "value", "type": "Object"}], "hidden": true}
}"#;

/// Loaded catalog over the fixture
pub(crate) fn fixture_catalog() -> Catalog {
    let catalog = Catalog::new(StaticSource::from_json(CATALOG).unwrap());
    catalog.load_signatures().unwrap();
    catalog
}

/// Transport with nothing behind it
pub(crate) struct NullTransport;

impl Transport for NullTransport {
    fn configure(&self, _api_base_url: Option<&str>, _tile_base_url: Option<&str>) {}

    fn reset(&self) {}
}

/// Client over the fixture catalog, not yet initialized
pub(crate) fn client() -> Client {
    Client::builder(
        Arc::new(NullTransport),
        Arc::new(Catalog::new(StaticSource::from_json(CATALOG).unwrap())),
    )
    .build()
}

/// Client over the fixture catalog with a custom class set
pub(crate) fn client_with_classes(classes: Vec<Arc<dyn ProxyClass>>) -> Client {
    Client::builder(
        Arc::new(NullTransport),
        Arc::new(Catalog::new(StaticSource::from_json(CATALOG).unwrap())),
    )
    .classes(classes)
    .build()
}

/// Synchronously initialized client
pub(crate) fn ready_client() -> Client {
    let client = client();
    client.initialize(None, None, None).unwrap();
    client
}
