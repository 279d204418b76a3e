//! Property path navigation over reflectors.
//!
//! [`MetaType`] pairs a reflector with the factory that produced it, so compound paths like
//! `customer.address.city` can be resolved one segment at a time: the head segment is looked
//! up in the current reflector, and the remainder continues in the reflector of the head's
//! getter type. An indexed segment (`lines[0]`) on an array property continues in the array's
//! element type.

use std::sync::Arc;

use crate::{
    metadata::typesystem::TypeRc,
    reflection::{
        factory::ReflectorFactory, invoker::InvokerRc, reflector::Reflector,
        tokenizer::PropertyTokenizer,
    },
    Result,
};

/// A runtime type viewed through its reflector.
pub struct MetaType<'f> {
    factory: &'f ReflectorFactory,
    reflector: Arc<Reflector>,
}

impl<'f> MetaType<'f> {
    /// Create the meta view of `ty`
    ///
    /// ## Arguments
    /// * 'ty'      - The type to describe
    /// * 'factory' - The factory providing reflectors
    ///
    /// # Errors
    /// Returns the reflector construction failure of `ty`.
    pub fn for_type(ty: &TypeRc, factory: &'f ReflectorFactory) -> Result<Self> {
        Ok(MetaType {
            factory,
            reflector: factory.find_for_type(ty)?,
        })
    }

    /// The underlying reflector
    pub fn reflector(&self) -> &Arc<Reflector> {
        &self.reflector
    }

    /// The meta view of the getter type of the plain property `name`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownProperty`] if `name` is not readable.
    pub fn meta_type_for_property(&self, name: &str) -> Result<MetaType<'f>> {
        let property_type = self.reflector.getter_type(name)?;
        MetaType::for_type(&property_type, self.factory)
    }

    fn meta_type_for_segment(&self, segment: &PropertyTokenizer<'_>) -> Result<MetaType<'f>> {
        let property_type = self.segment_type(segment)?;
        MetaType::for_type(&property_type, self.factory)
    }

    /// The getter type of one segment, stepping into the element type for indexed arrays
    fn segment_type(&self, segment: &PropertyTokenizer<'_>) -> Result<TypeRc> {
        let property_type = self.reflector.getter_type(segment.name())?;
        if segment.index().is_some() && property_type.is_array() {
            if let Some(element) = property_type.element_type() {
                return Ok(element);
            }
        }
        Ok(property_type)
    }

    /// Resolve `path` to its canonical spelling, matching every segment case-insensitively.
    ///
    /// Indexes are dropped from the result. Resolution stops at the first unknown segment and
    /// returns what was resolved so far; `None` if not even the first segment is known.
    ///
    /// ## Arguments
    /// * 'path'                   - A property path like `ORDER.customer_name`
    /// * 'use_camel_case_mapping' - Remove `_` from the path first, so `user_name` finds
    ///   `userName`
    ///
    /// # Errors
    /// Returns a reflector construction failure of a nested type.
    pub fn find_property(&self, path: &str, use_camel_case_mapping: bool) -> Result<Option<String>> {
        let path = if use_camel_case_mapping {
            path.replace('_', "")
        } else {
            path.to_string()
        };

        let mut resolved = String::new();
        self.build_property(&path, &mut resolved)?;
        Ok((!resolved.is_empty()).then_some(resolved))
    }

    fn build_property(&self, path: &str, builder: &mut String) -> Result<()> {
        let segment = PropertyTokenizer::new(path);
        let Some(name) = self.reflector.find_property_name(segment.name()) else {
            return Ok(());
        };

        builder.push_str(name);
        if let Some(children) = segment.children() {
            builder.push('.');
            self.meta_type_for_property(name)?
                .build_property(children, builder)?;
        }
        Ok(())
    }

    /// Whether every segment of `path` is readable
    ///
    /// # Errors
    /// Returns a reflector construction failure of a nested type.
    pub fn has_getter(&self, path: &str) -> Result<bool> {
        let segment = PropertyTokenizer::new(path);
        if !self.reflector.has_getter(segment.name()) {
            return Ok(false);
        }
        match segment.children() {
            Some(children) => self.meta_type_for_segment(&segment)?.has_getter(children),
            None => Ok(true),
        }
    }

    /// Whether the last segment of `path` is writable and every segment before it readable
    ///
    /// # Errors
    /// Returns a reflector construction failure of a nested type.
    pub fn has_setter(&self, path: &str) -> Result<bool> {
        let segment = PropertyTokenizer::new(path);
        match segment.children() {
            Some(children) => {
                if !self.reflector.has_getter(segment.name()) {
                    return Ok(false);
                }
                self.meta_type_for_segment(&segment)?.has_setter(children)
            }
            None => Ok(self.reflector.has_setter(segment.name())),
        }
    }

    /// The type read from `path`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownProperty`] for the first segment that cannot be read.
    pub fn getter_type(&self, path: &str) -> Result<TypeRc> {
        let segment = PropertyTokenizer::new(path);
        match segment.children() {
            Some(children) => self.meta_type_for_segment(&segment)?.getter_type(children),
            None => self.segment_type(&segment),
        }
    }

    /// The type written to `path`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownProperty`] if an intermediate segment cannot be read or
    /// the last one cannot be written.
    pub fn setter_type(&self, path: &str) -> Result<TypeRc> {
        let segment = PropertyTokenizer::new(path);
        match segment.children() {
            Some(children) => self.meta_type_for_segment(&segment)?.setter_type(children),
            None => self.reflector.setter_type(segment.name()),
        }
    }

    /// The read accessor of the plain property `name`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownProperty`] if `name` is not readable.
    pub fn get_invoker(&self, name: &str) -> Result<InvokerRc> {
        self.reflector.get_invoker(name)
    }

    /// The write accessor of the plain property `name`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownProperty`] if `name` is not writable.
    pub fn set_invoker(&self, name: &str) -> Result<InvokerRc> {
        self.reflector.set_invoker(name)
    }

    /// Names of all readable properties
    pub fn getter_names(&self) -> &[String] {
        self.reflector.readable_property_names()
    }

    /// Names of all writable properties
    pub fn setter_names(&self) -> &[String] {
        self.reflector.writable_property_names()
    }

    /// Whether the type declares a zero-argument constructor
    pub fn has_default_constructor(&self) -> bool {
        self.reflector.has_default_constructor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::typesystem::{PrimitiveKind, TypeBuilder, TypeRegistry},
        Error,
    };

    struct Shop {
        factory: ReflectorFactory,
        order: TypeRc,
        item: TypeRc,
    }

    fn shop() -> Shop {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let string = registry.string().unwrap();
        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();

        let item = TypeBuilder::class(registry.clone(), "shop", "Item")
            .property("sku", &string)
            .property("quantity", &int)
            .build()
            .unwrap();
        let items = registry.array_of(&item).unwrap();
        let customer = TypeBuilder::class(registry.clone(), "shop", "Customer")
            .property("customerName", &string)
            .build()
            .unwrap();
        let order = TypeBuilder::class(registry.clone(), "shop", "Order")
            .property("customer", &customer)
            .property("items", &items)
            .default_constructor()
            .build()
            .unwrap();

        Shop {
            factory: ReflectorFactory::new(registry),
            order,
            item,
        }
    }

    #[test]
    fn test_find_property() {
        let shop = shop();
        let meta = MetaType::for_type(&shop.order, &shop.factory).unwrap();

        assert_eq!(
            meta.find_property("CUSTOMER.CUSTOMERNAME", false).unwrap(),
            Some("customer.customerName".to_string())
        );
        assert_eq!(
            meta.find_property("customer.customer_name", true).unwrap(),
            Some("customer.customerName".to_string())
        );
        assert_eq!(
            meta.find_property("customer.customer_name", false).unwrap(),
            Some("customer.".to_string())
        );
        assert_eq!(meta.find_property("missing", false).unwrap(), None);
    }

    #[test]
    fn test_nested_getters_and_setters() {
        let shop = shop();
        let meta = MetaType::for_type(&shop.order, &shop.factory).unwrap();

        assert!(meta.has_getter("customer.customerName").unwrap());
        assert!(meta.has_setter("customer.customerName").unwrap());
        assert!(!meta.has_getter("customer.missing").unwrap());
        assert!(!meta.has_setter("missing.customerName").unwrap());
        assert!(meta.has_default_constructor());

        let string = shop.factory.registry().string().unwrap();
        assert_eq!(
            meta.getter_type("customer.customerName").unwrap().token,
            string.token
        );
        assert_eq!(
            meta.setter_type("customer.customerName").unwrap().token,
            string.token
        );
    }

    #[test]
    fn test_indexed_array_segments() {
        let shop = shop();
        let meta = MetaType::for_type(&shop.order, &shop.factory).unwrap();

        assert!(meta.getter_type("items").unwrap().is_array());
        assert_eq!(meta.getter_type("items[0]").unwrap().token, shop.item.token);
        assert!(meta.has_getter("items[1].sku").unwrap());
        assert_eq!(
            meta.setter_type("items[2].quantity").unwrap().flavor,
            crate::metadata::typesystem::TypeFlavor::I4
        );
    }

    #[test]
    fn test_unknown_segments() {
        let shop = shop();
        let meta = MetaType::for_type(&shop.order, &shop.factory).unwrap();

        assert!(matches!(
            meta.getter_type("nope.sku"),
            Err(Error::UnknownProperty { .. })
        ));
        assert!(matches!(
            meta.meta_type_for_property("nope"),
            Err(Error::UnknownProperty { .. })
        ));

        let customer = meta.meta_type_for_property("customer").unwrap();
        assert_eq!(customer.getter_names(), ["customerName"]);
        assert_eq!(customer.setter_names(), ["customerName"]);
    }
}
