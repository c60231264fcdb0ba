//! Type promotion
//!
//! Coerces an argument to the type an algorithm parameter declares.
//! Dispatch is on the declared type name, first match wins:
//! - Image, ImageCollection, Filter: construct the hand-written kind
//! - Feature / EEObject: collections reduce to their geometry first
//! - Geometry: feature collections reduce to their geometry
//! - FeatureCollection / EECollection / Collection: any collection passes
//! - ErrorMargin, Algorithm, Date, Dictionary, String, List: special cased
//! - anything else: registered types construct, unregistered pass through

use strata_core::{date_from_millis, parse_date, ProxyKind, StrataError, StrataResult, Value};

use crate::Client;

impl Client {
    /// Promote `value` to the type named `target`
    pub fn promote(&self, value: Value, target: &str) -> StrataResult<Value> {
        if value.is_null() || value.is_undefined() {
            return Ok(value);
        }

        match target {
            "Image" => self.construct("Image", vec![value]),
            "ImageCollection" => self.construct("ImageCollection", vec![value]),
            "Feature" | "EEObject" => {
                if value.is_collection() {
                    let geometry = self.call("Collection.geometry", vec![value])?;
                    self.call("Feature", vec![geometry])
                } else if target == "EEObject" && value.is_kind(ProxyKind::Image) {
                    Ok(value)
                } else {
                    self.construct("Feature", vec![value])
                }
            }
            "Geometry" => {
                if value.is_kind(ProxyKind::FeatureCollection) {
                    self.call("Collection.geometry", vec![value])
                } else {
                    self.construct("Geometry", vec![value])
                }
            }
            "FeatureCollection" | "EECollection" | "Collection" => {
                if value.is_collection() {
                    Ok(value)
                } else {
                    self.construct("FeatureCollection", vec![value])
                }
            }
            "Filter" => self.construct("Filter", vec![value]),
            "ErrorMargin" => match value {
                Value::Number(_) => self.call("ErrorMargin", vec![value, "meters".into()]),
                other => Ok(other),
            },
            "Algorithm" => match value {
                Value::String(name) => Ok(Value::Algorithm(name)),
                other => Ok(other),
            },
            "Date" => self.promote_date(value),
            "Dictionary" => {
                if !self.inner.types.read().contains("Dictionary")
                    || self.is_instance(&value, "Dictionary")
                {
                    Ok(value)
                } else if value.is_computed() {
                    self.construct("Dictionary", vec![value])
                } else {
                    Ok(value)
                }
            }
            "String" => {
                if value.is_string_like() {
                    self.construct("String", vec![value])
                } else {
                    Ok(value)
                }
            }
            "List" => Ok(value),
            _ => self.promote_registered(value, target),
        }
    }

    fn promote_date(&self, value: Value) -> StrataResult<Value> {
        match value {
            Value::String(s) => Ok(Value::Date(parse_date(&s)?)),
            Value::Number(millis) => Ok(Value::Date(date_from_millis(millis)?)),
            // Already a Date call: promoting again would cast twice.
            computed if computed.expression().is_some_and(|e| e.is_call_to("Date")) => {
                Ok(computed)
            }
            computed if computed.is_computed() => {
                let signature = self.signature("Date")?;
                self.call_expression(&signature, vec![computed])
                    .map(Value::Computed)
            }
            other => Ok(other),
        }
    }

    fn promote_registered(&self, value: Value, target: &str) -> StrataResult<Value> {
        let factory = {
            let types = self.inner.types.read();
            let Some(descriptor) = types.get(target) else {
                return Ok(value);
            };
            value.as_str().map(|member| {
                descriptor
                    .static_member(member)
                    .map(|m| m.algorithm.clone())
                    .ok_or_else(|| StrataError::UnknownAlgorithm {
                        type_name: target.to_string(),
                        member: member.to_string(),
                    })
            })
        };

        if self.is_instance(&value, target) {
            return Ok(value);
        }
        match factory {
            Some(algorithm) => self.call(&algorithm?, Vec::new()),
            None => self.construct(target, vec![value]),
        }
    }
}
