//! The two ways of declaring types.
//!
//! The builder style describes a type inside a closure handed to one of the
//! `TypeDescriptor::define_*` constructors. The declarative style implements one of the
//! `*Definition` traits on a Rust type and declares fields with snake-cased names. Both are
//! normalized into the same [`TypeDescriptor`] before registration, so the registry never
//! knows which style a type came from.

use std::sync::Arc;

use heck::ToLowerCamelCase;
use indexmap::IndexMap;

use crate::error::FieldError;
use crate::error::SchemaError;
use crate::execution::ResolveInfo;
use crate::execution::Resolved;
use crate::json_ext::Value;
use crate::spec::DecoratorSpec;
use crate::spec::EnumType;
use crate::spec::EnumValueDescriptor;
use crate::spec::FieldDescriptor;
use crate::spec::FieldType;
use crate::spec::InputType;
use crate::spec::Resolver;
use crate::spec::TypeDefinition;
use crate::spec::TypeDescriptor;
use crate::spec::field_type::is_valid_name;
use crate::spec::input::ArgumentDescriptor;
use crate::spec::schema::ObjectType;
use crate::spec::schema::ScalarType;
use crate::spec::schema::UnionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Naming {
    Verbatim,
    SnakeCase,
}

impl Naming {
    fn exposed(self, name: &str) -> String {
        match self {
            Naming::Verbatim => name.to_string(),
            Naming::SnakeCase => name.to_lower_camel_case(),
        }
    }
}

/// A field as declared, before its type reference is parsed.
#[derive(Debug)]
pub struct FieldDeclaration {
    name: String,
    field_type: String,
    description: Option<String>,
    deprecation_reason: Option<String>,
    resolver: Resolver,
    decorators: Vec<DecoratorSpec>,
    arguments: Arguments,
}

impl FieldDeclaration {
    fn new(name: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            description: None,
            deprecation_reason: None,
            resolver: Resolver::Default,
            decorators: Vec::new(),
            arguments: Arguments::default(),
        }
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(&mut self, reason: impl Into<String>) -> &mut Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    /// Bind the field to a method of the object, bypassing name derivation.
    pub fn method(&mut self, method: impl Into<String>) -> &mut Self {
        self.resolver = Resolver::Method(method.into());
        self
    }

    /// Read the field from one property of the object.
    pub fn hash_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.resolver = Resolver::HashKey(key.into());
        self
    }

    pub fn resolve<F>(&mut self, resolver: F) -> &mut Self
    where
        F: Fn(&ResolveInfo<'_>) -> Result<Resolved, FieldError> + Send + Sync + 'static,
    {
        self.resolver = Resolver::Function(Arc::new(resolver));
        self
    }

    pub fn decorate(&mut self, decorator: DecoratorSpec) -> &mut Self {
        self.decorators.push(decorator);
        self
    }

    pub fn upcase(&mut self) -> &mut Self {
        self.decorate(DecoratorSpec::new("upcase"))
    }

    pub fn argument(&mut self, name: &str, field_type: &str) -> &mut ArgumentDeclaration {
        self.arguments.argument(name, field_type)
    }

    fn into_descriptor(self, owner: &str, naming: Naming) -> Result<FieldDescriptor, SchemaError> {
        let field_type = self.field_type.parse::<FieldType>()?;
        let mut descriptor = FieldDescriptor::new(owner, naming.exposed(&self.name), field_type);
        descriptor.arguments = self
            .arguments
            .into_input_type(format!("{owner}.{}", descriptor.name), naming)?;
        descriptor.description = self.description;
        descriptor.deprecation_reason = self.deprecation_reason;
        descriptor.resolver = self.resolver;
        descriptor.decorators = self.decorators;
        Ok(descriptor)
    }
}

/// An argument as declared.
#[derive(Debug)]
pub struct ArgumentDeclaration {
    name: String,
    field_type: String,
    description: Option<String>,
    default_value: Option<Value>,
    deprecation_reason: Option<String>,
}

impl ArgumentDeclaration {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn deprecated(&mut self, reason: impl Into<String>) -> &mut Self {
        self.deprecation_reason = Some(reason.into());
        self
    }
}

/// Collects field declarations.
#[derive(Debug, Default)]
pub struct Fields {
    declarations: Vec<FieldDeclaration>,
}

impl Fields {
    pub fn field(&mut self, name: &str, field_type: &str) -> &mut FieldDeclaration {
        self.declarations.push(FieldDeclaration::new(name, field_type));
        let index = self.declarations.len() - 1;
        &mut self.declarations[index]
    }

    fn into_descriptors(
        self,
        owner: &str,
        naming: Naming,
    ) -> Result<IndexMap<String, FieldDescriptor>, SchemaError> {
        let mut fields = IndexMap::with_capacity(self.declarations.len());
        for declaration in self.declarations {
            let descriptor = declaration.into_descriptor(owner, naming)?;
            if fields.contains_key(&descriptor.name) {
                return Err(SchemaError::InvalidSchema(format!(
                    "'{owner}' declares field '{}' twice",
                    descriptor.name
                )));
            }
            fields.insert(descriptor.name.clone(), descriptor);
        }
        Ok(fields)
    }
}

/// Collects argument declarations.
#[derive(Debug, Default)]
pub struct Arguments {
    declarations: Vec<ArgumentDeclaration>,
}

impl Arguments {
    pub fn argument(&mut self, name: &str, field_type: &str) -> &mut ArgumentDeclaration {
        self.declarations.push(ArgumentDeclaration {
            name: name.to_string(),
            field_type: field_type.to_string(),
            description: None,
            default_value: None,
            deprecation_reason: None,
        });
        let index = self.declarations.len() - 1;
        &mut self.declarations[index]
    }

    fn into_input_type(self, name: String, naming: Naming) -> Result<InputType, SchemaError> {
        let arguments = self
            .declarations
            .into_iter()
            .map(|declaration| -> Result<ArgumentDescriptor, SchemaError> {
                let mut argument = ArgumentDescriptor::new(
                    naming.exposed(&declaration.name),
                    declaration.field_type.parse::<FieldType>()?,
                );
                argument.description = declaration.description;
                argument.default_value = declaration.default_value;
                argument.deprecation_reason = declaration.deprecation_reason;
                Ok(argument)
            })
            .collect::<Result<Vec<_>, _>>()?;
        InputType::new(name, arguments)
    }
}

/// Collects enum values.
#[derive(Debug, Default)]
pub struct EnumValues {
    values: Vec<EnumValueDescriptor>,
}

impl EnumValues {
    pub fn value(&mut self, label: &str) -> &mut EnumValueDescriptor {
        self.values.push(EnumValueDescriptor::new(label));
        let index = self.values.len() - 1;
        &mut self.values[index]
    }
}

/// Describes an object or interface type in the builder style.
#[derive(Debug, Default)]
pub struct ObjectTypeBuilder {
    description: Option<String>,
    interfaces: Vec<String>,
    global_id: bool,
    fields: Fields,
}

impl ObjectTypeBuilder {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn implements(&mut self, interface: impl Into<String>) -> &mut Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Mark the type globally identifiable. It gets an `id: ID!` field unless it declares one.
    pub fn global_id(&mut self) -> &mut Self {
        self.global_id = true;
        self
    }

    pub fn field(&mut self, name: &str, field_type: &str) -> &mut FieldDeclaration {
        self.fields.field(name, field_type)
    }
}

/// Describes an input type in the builder style.
#[derive(Debug, Default)]
pub struct InputTypeBuilder {
    description: Option<String>,
    arguments: Arguments,
}

impl InputTypeBuilder {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn argument(&mut self, name: &str, field_type: &str) -> &mut ArgumentDeclaration {
        self.arguments.argument(name, field_type)
    }
}

/// Describes an enum type in the builder style.
#[derive(Debug, Default)]
pub struct EnumTypeBuilder {
    description: Option<String>,
    values: EnumValues,
}

impl EnumTypeBuilder {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn value(&mut self, label: &str) -> &mut EnumValueDescriptor {
        self.values.value(label)
    }
}

/// Describes a union type in the builder style.
#[derive(Debug, Default)]
pub struct UnionTypeBuilder {
    description: Option<String>,
    possible_types: Vec<String>,
}

impl UnionTypeBuilder {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn possible_type(&mut self, name: impl Into<String>) -> &mut Self {
        self.possible_types.push(name.into());
        self
    }
}

/// An object type declared on a Rust type.
///
/// Field and argument names are written in snake case and exposed in lower camel case.
pub trait ObjectDefinition {
    const NAME: &'static str;

    fn description() -> Option<&'static str> {
        None
    }

    fn interfaces() -> Vec<&'static str> {
        Vec::new()
    }

    fn global_id() -> bool {
        false
    }

    fn fields(fields: &mut Fields);
}

/// An interface type declared on a Rust type.
pub trait InterfaceDefinition {
    const NAME: &'static str;

    fn description() -> Option<&'static str> {
        None
    }

    fn global_id() -> bool {
        false
    }

    fn fields(fields: &mut Fields);
}

/// An input type declared on a Rust type.
pub trait InputDefinition {
    const NAME: &'static str;

    fn description() -> Option<&'static str> {
        None
    }

    fn arguments(arguments: &mut Arguments);
}

/// An enum type declared on a Rust type.
pub trait EnumDefinition {
    const NAME: &'static str;

    fn description() -> Option<&'static str> {
        None
    }

    fn values(values: &mut EnumValues);
}

/// A custom scalar declared on a Rust type.
///
/// Coercion failures carry a short reason; the engine wraps them into argument or result
/// errors.
pub trait ScalarDefinition {
    const NAME: &'static str;

    fn description() -> Option<&'static str> {
        None
    }

    fn coerce_input(value: &Value) -> Result<Value, String>;

    fn coerce_result(value: &Value) -> Result<Value, String>;
}

fn check_name(name: &str) -> Result<(), SchemaError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidSchema(format!("invalid type name '{name}'")))
    }
}

fn object_type(
    name: &str,
    builder: ObjectTypeBuilder,
    naming: Naming,
) -> Result<ObjectType, SchemaError> {
    check_name(name)?;
    Ok(ObjectType {
        fields: builder.fields.into_descriptors(name, naming)?,
        interfaces: builder.interfaces,
        global_id: builder.global_id,
    })
}

impl TypeDescriptor {
    pub fn define_object(
        name: impl Into<String>,
        define: impl FnOnce(&mut ObjectTypeBuilder),
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut builder = ObjectTypeBuilder::default();
        define(&mut builder);
        let description = builder.description.take();
        let object = object_type(&name, builder, Naming::Verbatim)?;
        Ok(TypeDescriptor::new(
            name,
            description,
            TypeDefinition::Object(object),
        ))
    }

    /// Interfaces cannot implement other interfaces; `implements` is ignored here.
    pub fn define_interface(
        name: impl Into<String>,
        define: impl FnOnce(&mut ObjectTypeBuilder),
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut builder = ObjectTypeBuilder::default();
        define(&mut builder);
        builder.interfaces.clear();
        let description = builder.description.take();
        let interface = object_type(&name, builder, Naming::Verbatim)?;
        Ok(TypeDescriptor::new(
            name,
            description,
            TypeDefinition::Interface(interface),
        ))
    }

    pub fn define_input(
        name: impl Into<String>,
        define: impl FnOnce(&mut InputTypeBuilder),
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        check_name(&name)?;
        let mut builder = InputTypeBuilder::default();
        define(&mut builder);
        let input = builder
            .arguments
            .into_input_type(name.clone(), Naming::Verbatim)?;
        Ok(TypeDescriptor::new(
            name,
            builder.description,
            TypeDefinition::Input(input),
        ))
    }

    pub fn define_enum(
        name: impl Into<String>,
        define: impl FnOnce(&mut EnumTypeBuilder),
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        check_name(&name)?;
        let mut builder = EnumTypeBuilder::default();
        define(&mut builder);
        let values = EnumType::new(name.clone(), builder.values.values)?;
        Ok(TypeDescriptor::new(
            name,
            builder.description,
            TypeDefinition::Enum(values),
        ))
    }

    pub fn define_union(
        name: impl Into<String>,
        define: impl FnOnce(&mut UnionTypeBuilder),
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        check_name(&name)?;
        let mut builder = UnionTypeBuilder::default();
        define(&mut builder);
        if builder.possible_types.is_empty() {
            return Err(SchemaError::InvalidSchema(format!(
                "union '{name}' has no possible types"
            )));
        }
        Ok(TypeDescriptor::new(
            name,
            builder.description,
            TypeDefinition::Union(UnionType {
                possible_types: builder.possible_types,
            }),
        ))
    }

    pub fn from_object<T: ObjectDefinition>() -> Result<Self, SchemaError> {
        let mut builder = ObjectTypeBuilder {
            description: None,
            interfaces: T::interfaces().into_iter().map(str::to_string).collect(),
            global_id: T::global_id(),
            fields: Fields::default(),
        };
        T::fields(&mut builder.fields);
        Ok(TypeDescriptor::new(
            T::NAME,
            T::description().map(str::to_string),
            TypeDefinition::Object(object_type(T::NAME, builder, Naming::SnakeCase)?),
        ))
    }

    pub fn from_interface<T: InterfaceDefinition>() -> Result<Self, SchemaError> {
        let mut builder = ObjectTypeBuilder {
            global_id: T::global_id(),
            ..Default::default()
        };
        T::fields(&mut builder.fields);
        Ok(TypeDescriptor::new(
            T::NAME,
            T::description().map(str::to_string),
            TypeDefinition::Interface(object_type(T::NAME, builder, Naming::SnakeCase)?),
        ))
    }

    pub fn from_input<T: InputDefinition>() -> Result<Self, SchemaError> {
        check_name(T::NAME)?;
        let mut arguments = Arguments::default();
        T::arguments(&mut arguments);
        Ok(TypeDescriptor::new(
            T::NAME,
            T::description().map(str::to_string),
            TypeDefinition::Input(
                arguments.into_input_type(T::NAME.to_string(), Naming::SnakeCase)?,
            ),
        ))
    }

    pub fn from_enum<T: EnumDefinition>() -> Result<Self, SchemaError> {
        check_name(T::NAME)?;
        let mut values = EnumValues::default();
        T::values(&mut values);
        Ok(TypeDescriptor::new(
            T::NAME,
            T::description().map(str::to_string),
            TypeDefinition::Enum(EnumType::new(T::NAME, values.values)?),
        ))
    }

    pub fn from_scalar<T: ScalarDefinition + 'static>() -> Result<Self, SchemaError> {
        check_name(T::NAME)?;
        Ok(TypeDescriptor::new(
            T::NAME,
            T::description().map(str::to_string),
            TypeDefinition::Scalar(ScalarType::new(T::coerce_input, T::coerce_result)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::TypeKind;

    struct Ensemble;

    impl ObjectDefinition for Ensemble {
        const NAME: &'static str = "Ensemble";

        fn interfaces() -> Vec<&'static str> {
            vec!["NamedEntity"]
        }

        fn fields(fields: &mut Fields) {
            fields.field("name", "String!");
            fields.field("upcase_name", "String").hash_key("name").upcase();
            fields
                .field("musicians", "[Musician!]!")
                .argument("first_name", "String")
                .default_value("Bela");
        }
    }

    #[test]
    fn builder_style_keeps_names() {
        let descriptor = TypeDescriptor::define_object("Instrument", |t| {
            t.description("A musical instrument");
            t.global_id();
            t.field("upcasedId", "ID!").upcase();
            t.field("family", "Family!").deprecated("use kind");
        })
        .unwrap();

        assert_eq!(descriptor.kind(), TypeKind::Object);
        assert_eq!(descriptor.description(), Some("A musical instrument"));
        let object = descriptor.as_object().unwrap();
        assert!(object.supports_global_id());
        let upcased = object.field("upcasedId").unwrap();
        assert_eq!(upcased.field_type, "ID!".parse::<FieldType>().unwrap());
        assert_eq!(upcased.decorators, vec![DecoratorSpec::new("upcase")]);
        assert!(object.field("family").unwrap().is_deprecated());
    }

    #[test]
    fn declarative_style_is_camel_cased() {
        let descriptor = TypeDescriptor::from_object::<Ensemble>().unwrap();
        let object = descriptor.as_object().unwrap();
        let names = object.fields().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["name", "upcaseName", "musicians"]);
        assert_eq!(object.interfaces().to_vec(), vec!["NamedEntity".to_string()]);

        let musicians = object.field("musicians").unwrap();
        assert_eq!(musicians.arguments.name(), "Ensemble.musicians");
        let argument = musicians.arguments.argument("firstName").unwrap();
        assert_eq!(argument.default_value, Some(Value::from("Bela")));
        assert!(matches!(
            object.field("upcaseName").unwrap().resolver,
            Resolver::HashKey(ref key) if key == "name"
        ));
    }

    #[test]
    fn invalid_type_references_are_schema_errors() {
        let error = TypeDescriptor::define_object("Broken", |t| {
            t.field("name", "[String");
        })
        .unwrap_err();
        assert!(matches!(error, SchemaError::InvalidSchema(_)));

        let error = TypeDescriptor::define_object("Jazz::Broken", |_| {}).unwrap_err();
        assert!(matches!(error, SchemaError::InvalidSchema(_)));
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let error = TypeDescriptor::define_object("Instrument", |t| {
            t.field("name", "String");
            t.field("name", "String!");
        })
        .unwrap_err();
        assert!(matches!(error, SchemaError::InvalidSchema(_)));
    }

    #[test]
    fn unions_need_members() {
        assert!(TypeDescriptor::define_union("PerformingAct", |_| {}).is_err());
        let union = TypeDescriptor::define_union("PerformingAct", |t| {
            t.possible_type("Musician").possible_type("Ensemble");
        })
        .unwrap();
        assert_eq!(union.kind(), TypeKind::Union);
        assert!(union.is_abstract());
    }
}
