//! Fixture algorithm catalog
//!
//! A small catalog shaped like the service's: hand-written namespaces
//! (Image, Collection, ...), namespaces that imply generated classes
//! (Reducer, Projection, Array), unbound namespaces (Landsat, Terrain),
//! a hidden algorithm, and a reserved namespace (List).

use strata_core::{parse_catalog, SignatureMap};
use strata_registry::StaticSource;

pub const FIXTURE_CATALOG: &str = r#"{
    "data": {
        "Image.constant": {"returns": "Image", "args": [{"name": "value", "type": "Object"}]},
        "Image.load": {"returns": "Image", "args": [
            {"name": "id", "type": "String"},
            {"name": "version", "type": "Long", "optional": true}
        ]},
        "Image.add": {"returns": "Image", "args": [
            {"name": "image1", "type": "Image"},
            {"name": "image2", "type": "Image"}
        ]},
        "Image.reduceRegion": {"returns": "Dictionary", "args": [
            {"name": "image", "type": "Image"},
            {"name": "reducer", "type": "Reducer"},
            {"name": "geometry", "type": "Geometry", "optional": true},
            {"name": "maxError", "type": "ErrorMargin", "optional": true}
        ]},
        "ImageCollection.load": {"returns": "ImageCollection", "args": [{"name": "id", "type": "String"}]},
        "ImageCollection.fromImages": {"returns": "ImageCollection", "args": [{"name": "images", "type": "List"}]},
        "Collection": {"returns": "FeatureCollection", "args": [{"name": "features", "type": "List"}]},
        "Collection.loadTable": {"returns": "FeatureCollection", "args": [{"name": "tableId", "type": "Object"}]},
        "Collection.geometry": {"returns": "Geometry", "args": [
            {"name": "collection", "type": "FeatureCollection"},
            {"name": "maxError", "type": "ErrorMargin", "optional": true}
        ]},
        "Collection.filter": {"returns": "Collection", "args": [
            {"name": "collection", "type": "Collection"},
            {"name": "filter", "type": "Filter"}
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
        "Reducer.sum": {"returns": "Reducer", "args": []},
        "Reducer.combine": {"returns": "Reducer", "args": [
            {"name": "reducer1", "type": "Reducer"},
            {"name": "reducer2", "type": "Reducer"}
        ]},
        "Projection": {"returns": "Projection", "args": [{"name": "crs", "type": "Object"}]},
        "Projection.wkt": {"returns": "String", "args": [{"name": "proj", "type": "Projection"}]},
        "Array": {"returns": "Array", "args": [{"name": "values", "type": "Object"}]},
        "Array.transpose": {"returns": "Array<Float>", "args": [{"name": "array", "type": "Array"}]},
        "List.sequence": {"returns": "List<Number>", "args": [
            {"name": "start", "type": "Float"},
            {"name": "end", "type": "Float", "optional": true}
        ]},
        "Landsat.simpleComposite": {"returns": "Image", "args": [
            {"name": "collection", "type": "ImageCollection"},
            {"name": "percentile", "type": "Float", "optional": true}
        ], "description": "Computes a Landsat TOA composite."},
        "Landsat.TOA.calibrate": {"returns": "Image", "args": [{"name": "image", "type": "Image"}]},
        "Terrain.slope": {"returns": "Image", "args": [{"name": "input", "type": "Image"}]},
        "Debug.trace": {"returns": "Object", "args": [{"name": "value", "type": "Object"}], "hidden": true}
    }
}"#;

/// Classes the fixture catalog generates, in generation order
pub const FIXTURE_GENERATED: [&str; 3] = ["Array", "Projection", "Reducer"];

/// Parsed fixture catalog
pub fn fixture_catalog() -> SignatureMap {
    parse_catalog(FIXTURE_CATALOG).unwrap_or_default()
}

/// Source serving the fixture catalog
pub fn fixture_source() -> StaticSource {
    StaticSource::new(fixture_catalog())
}
