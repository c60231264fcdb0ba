//! Proxy construction and algorithm calls

use std::collections::BTreeMap;

use strata_core::{
    Expression, Proxy, ProxyKind, Signature, StrataError, StrataResult, TypeOrigin, Value,
};

use crate::Client;

impl Client {
    /// Construct an instance of a registered type.
    ///
    /// The descriptor is looked up on every call, so construction always
    /// reflects the type currently registered under `type_name`.
    pub fn construct(&self, type_name: &str, args: Vec<Value>) -> StrataResult<Value> {
        let origin = self
            .inner
            .types
            .read()
            .get(type_name)
            .map(|descriptor| descriptor.origin());

        match origin {
            Some(TypeOrigin::HandWritten(kind)) => self.construct_hand_written(kind, args),
            Some(TypeOrigin::Generated) => self.construct_generated(type_name, args),
            None => Err(StrataError::InvalidArgument(format!(
                "{} is not a registered type",
                type_name
            ))),
        }
    }

    /// Promote the arguments and call an algorithm; the result is promoted
    /// to the algorithm's return type.
    pub fn call(&self, name: &str, args: Vec<Value>) -> StrataResult<Value> {
        let signature = self.signature(name)?;
        let expression = self.call_expression(&signature, args)?;
        self.promote(Value::Computed(expression), signature.bare_return_type())
    }

    /// Named-argument form of [`Client::call`]
    pub fn apply(&self, name: &str, args: BTreeMap<String, Value>) -> StrataResult<Value> {
        let signature = self.signature(name)?;

        let mut promoted = BTreeMap::new();
        for (arg_name, value) in args {
            let value = match signature.args.iter().find(|decl| decl.name == arg_name) {
                Some(decl) => self.promote(value, &decl.type_name)?,
                // Left for the registry to reject.
                None => value,
            };
            promoted.insert(arg_name, value);
        }

        let expression = self.inner.functions.build_call_named(name, promoted)?;
        self.promote(Value::Computed(expression), signature.bare_return_type())
    }

    pub(crate) fn signature(&self, name: &str) -> StrataResult<Signature> {
        self.inner
            .functions
            .signature(name)
            .ok_or_else(|| StrataError::UnknownFunction(name.to_string()))
    }

    /// Promote positional arguments to their declared types and build the call
    pub(crate) fn call_expression(
        &self,
        signature: &Signature,
        args: Vec<Value>,
    ) -> StrataResult<Expression> {
        let mut promoted = Vec::with_capacity(args.len());
        for (i, value) in args.into_iter().enumerate() {
            let value = match signature.args.get(i) {
                Some(decl) => self.promote(value, &decl.type_name)?,
                None => value,
            };
            promoted.push(value);
        }
        self.inner.functions.build_call(&signature.name, promoted)
    }

    fn call_by_name(&self, name: &str, args: Vec<Value>) -> StrataResult<Expression> {
        let signature = self.signature(name)?;
        self.call_expression(&signature, args)
    }

    fn construct_generated(&self, type_name: &str, mut args: Vec<Value>) -> StrataResult<Value> {
        if args.len() == 1 && args[0].is_computed() {
            if let Some(expression) = args.pop().and_then(Value::into_expression) {
                return Ok(Proxy::generated(type_name, expression).into());
            }
        }
        let expression = self.call_by_name(type_name, args)?;
        Ok(Proxy::generated(type_name, expression).into())
    }

    fn construct_hand_written(&self, kind: ProxyKind, mut args: Vec<Value>) -> StrataResult<Value> {
        let wrap = |expression: Expression| -> StrataResult<Value> {
            Ok(Value::Proxy(Proxy::hand_written(kind, expression)))
        };

        if args.len() > 1 {
            return wrap(self.call_by_name(kind.type_name(), args)?);
        }
        let Some(value) = args.pop() else {
            return Err(StrataError::InvalidArgument(format!(
                "{} requires an argument",
                kind.type_name()
            )));
        };

        match (kind, value) {
            (_, Value::Proxy(proxy)) if proxy.kind() == kind => Ok(Value::Proxy(proxy)),
            (ProxyKind::Feature, value @ Value::Proxy(_))
                if value.is_kind(ProxyKind::Geometry) =>
            {
                wrap(self.call_by_name("Feature", vec![value])?)
            }
            (ProxyKind::FeatureCollection, value @ Value::Proxy(_))
                if value.is_kind(ProxyKind::Feature) || value.is_kind(ProxyKind::Geometry) =>
            {
                wrap(self.call_by_name("Collection", vec![Value::List(vec![value])])?)
            }
            (_, value) if value.is_computed() => match value.into_expression() {
                Some(expression) => wrap(expression),
                None => Err(StrataError::InvalidArgument(kind.type_name().to_string())),
            },

            (ProxyKind::Image, value @ Value::Number(_)) => {
                wrap(self.call_by_name("Image.constant", vec![value])?)
            }
            (ProxyKind::Image, value @ Value::String(_)) => {
                wrap(self.call_by_name("Image.load", vec![value])?)
            }
            (ProxyKind::ImageCollection, value @ Value::String(_)) => {
                wrap(self.call_by_name("ImageCollection.load", vec![value])?)
            }
            (ProxyKind::ImageCollection, value @ Value::List(_)) => {
                wrap(self.call_by_name("ImageCollection.fromImages", vec![value])?)
            }
            (ProxyKind::FeatureCollection, value @ Value::String(_)) => {
                wrap(self.call_by_name("Collection.loadTable", vec![value])?)
            }
            (ProxyKind::FeatureCollection, value @ Value::List(_)) => {
                wrap(self.call_by_name("Collection", vec![value])?)
            }
            (ProxyKind::Geometry, Value::Dictionary(geojson)) if geojson.contains_key("type") => {
                wrap(Expression::constant(Value::Dictionary(geojson)))
            }
            (ProxyKind::Number, value @ Value::Number(_))
            | (ProxyKind::String, value @ Value::String(_))
            | (ProxyKind::List, value @ Value::List(_))
            | (ProxyKind::Dictionary, value @ Value::Dictionary(_))
            | (ProxyKind::Date, value @ Value::Date(_)) => wrap(Expression::constant(value)),
            (ProxyKind::Date, value @ (Value::Number(_) | Value::String(_))) => {
                wrap(self.call_by_name("Date", vec![value])?)
            }

            (_, value) => Err(StrataError::InvalidArgument(format!(
                "cannot construct {} from {}",
                kind.type_name(),
                value.describe()
            ))),
        }
    }
}
