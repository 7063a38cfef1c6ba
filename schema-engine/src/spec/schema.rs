//! GraphQL schema.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use derivative::Derivative;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::error::FieldError;
use crate::error::SchemaError;
use crate::execution::Resolvable;
use crate::global_id;
use crate::global_id::GlobalId;
use crate::json_ext::Value;
use crate::spec::Decorator;
use crate::spec::EnumType;
use crate::spec::FieldDescriptor;
use crate::spec::FieldType;
use crate::spec::InputType;
use crate::spec::OperationKind;
use crate::spec::definition::EnumDefinition;
use crate::spec::definition::InputDefinition;
use crate::spec::definition::InterfaceDefinition;
use crate::spec::definition::ObjectDefinition;
use crate::spec::definition::ScalarDefinition;
use crate::spec::field;
use crate::store::Record;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Object,
    Interface,
    Union,
    Enum,
    Input,
    Scalar,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            TypeKind::Object => "object",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
            TypeKind::Enum => "enum",
            TypeKind::Input => "input",
            TypeKind::Scalar => "scalar",
        };
        write!(f, "{kind}")
    }
}

/// Fields of an object or interface type.
#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    pub(crate) fields: IndexMap<String, FieldDescriptor>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) global_id: bool,
}

impl ObjectType {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn supports_global_id(&self) -> bool {
        self.global_id
    }
}

#[derive(Debug, Clone)]
pub struct UnionType {
    pub(crate) possible_types: Vec<String>,
}

impl UnionType {
    pub fn possible_types(&self) -> &[String] {
        &self.possible_types
    }
}

pub type ScalarCoercion = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// A custom scalar.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct ScalarType {
    #[derivative(Debug = "ignore")]
    coerce_input: ScalarCoercion,
    #[derivative(Debug = "ignore")]
    coerce_result: ScalarCoercion,
}

impl ScalarType {
    pub fn new(
        coerce_input: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
        coerce_result: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            coerce_input: Arc::new(coerce_input),
            coerce_result: Arc::new(coerce_result),
        }
    }

    pub fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        (self.coerce_input)(value)
    }

    pub fn coerce_result(&self, value: &Value) -> Result<Value, String> {
        (self.coerce_result)(value)
    }
}

#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Object(ObjectType),
    Interface(ObjectType),
    Union(UnionType),
    Enum(EnumType),
    Input(InputType),
    Scalar(ScalarType),
}

/// A registered type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    description: Option<String>,
    definition: TypeDefinition,
}

impl TypeDescriptor {
    pub(crate) fn new(
        name: impl Into<String>,
        description: Option<String>,
        definition: TypeDefinition,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            definition,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn definition(&self) -> &TypeDefinition {
        &self.definition
    }

    pub fn kind(&self) -> TypeKind {
        match self.definition {
            TypeDefinition::Object(_) => TypeKind::Object,
            TypeDefinition::Interface(_) => TypeKind::Interface,
            TypeDefinition::Union(_) => TypeKind::Union,
            TypeDefinition::Enum(_) => TypeKind::Enum,
            TypeDefinition::Input(_) => TypeKind::Input,
            TypeDefinition::Scalar(_) => TypeKind::Scalar,
        }
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind(), TypeKind::Interface | TypeKind::Union)
    }

    /// The fields of an object or interface type.
    pub fn as_object(&self) -> Option<&ObjectType> {
        match &self.definition {
            TypeDefinition::Object(object) | TypeDefinition::Interface(object) => Some(object),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.as_object().and_then(|object| object.field(name))
    }
}

/// Strip the module path from a runtime kind: `jazz::models::Musician` becomes `Musician`.
pub fn kind_name(kind: &str) -> &str {
    kind.rsplit("::").next().unwrap_or(kind)
}

/// The type registry.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Schema {
    types: IndexMap<String, TypeDescriptor>,
    #[derivative(Debug = "ignore")]
    decorators: HashMap<String, Arc<dyn Decorator>>,
    query_type: Option<String>,
    mutation_type: Option<String>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// An empty registry knowing the built-in decorators `upcase`, `downcase` and `append`.
    pub fn new() -> Self {
        let mut schema = Self {
            types: IndexMap::new(),
            decorators: HashMap::new(),
            query_type: None,
            mutation_type: None,
        };
        schema.register_decorator("upcase", field::upcase);
        schema.register_decorator("downcase", field::downcase);
        schema.register_decorator("append", field::append);
        schema
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), SchemaError> {
        let name = descriptor.name().to_string();
        if self.types.contains_key(&name) || FieldType::named(name.clone()).is_builtin_scalar() {
            return Err(SchemaError::DuplicateTypeName(name));
        }
        tracing::debug!(type_name = %name, kind = %descriptor.kind(), "registered type");
        self.types.insert(name, descriptor);
        Ok(())
    }

    pub fn register_object<T: ObjectDefinition>(&mut self) -> Result<(), SchemaError> {
        self.register(TypeDescriptor::from_object::<T>()?)
    }

    pub fn register_interface<T: InterfaceDefinition>(&mut self) -> Result<(), SchemaError> {
        self.register(TypeDescriptor::from_interface::<T>()?)
    }

    pub fn register_input<T: InputDefinition>(&mut self) -> Result<(), SchemaError> {
        self.register(TypeDescriptor::from_input::<T>()?)
    }

    pub fn register_enum<T: EnumDefinition>(&mut self) -> Result<(), SchemaError> {
        self.register(TypeDescriptor::from_enum::<T>()?)
    }

    pub fn register_scalar<T: ScalarDefinition + 'static>(&mut self) -> Result<(), SchemaError> {
        self.register(TypeDescriptor::from_scalar::<T>()?)
    }

    /// Make a decorator available to fields under `name`, replacing any previous one.
    pub fn register_decorator(
        &mut self,
        name: impl Into<String>,
        decorator: impl Decorator + 'static,
    ) {
        self.decorators.insert(name.into(), Arc::new(decorator));
    }

    pub fn decorator(&self, name: &str) -> Option<&dyn Decorator> {
        self.decorators.get(name).map(|d| d.as_ref())
    }

    pub fn lookup(&self, name: &str) -> Result<&TypeDescriptor, SchemaError> {
        self.types
            .get(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    pub fn set_query_type(&mut self, name: impl Into<String>) {
        self.query_type = Some(name.into());
    }

    pub fn set_mutation_type(&mut self, name: impl Into<String>) {
        self.mutation_type = Some(name.into());
    }

    /// The entry type for `kind`, `Query` and `Mutation` unless configured otherwise.
    pub fn root_type(&self, kind: OperationKind) -> Result<&TypeDescriptor, SchemaError> {
        let name = match kind {
            OperationKind::Query => self.query_type.as_deref(),
            OperationKind::Mutation => self.mutation_type.as_deref(),
        }
        .unwrap_or_else(|| kind.default_type_name());
        let descriptor = self.lookup(name)?;
        if descriptor.kind() != TypeKind::Object {
            return Err(SchemaError::InvalidSchema(format!(
                "{kind} root type '{name}' is not an object type"
            )));
        }
        Ok(descriptor)
    }

    /// Returns `true` if `concrete` is a member of the union, or an implementer of the
    /// interface, named `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: &str, concrete: &str) -> bool {
        match self.types.get(abstract_type).map(TypeDescriptor::definition) {
            Some(TypeDefinition::Union(union)) => {
                union.possible_types.iter().any(|member| member == concrete)
            }
            Some(TypeDefinition::Interface(_)) => self
                .types
                .get(concrete)
                .and_then(|descriptor| match descriptor.definition() {
                    TypeDefinition::Object(object) => Some(object),
                    _ => None,
                })
                .is_some_and(|object| object.interfaces.iter().any(|i| i == abstract_type)),
            _ => false,
        }
    }

    /// Pick the object type a runtime instance is rendered as, for a field declared with the
    /// abstract type `abstract_type`.
    ///
    /// The instance's kind, stripped of its module path, names the type. Nothing else is
    /// consulted.
    pub fn resolve_concrete_type(
        &self,
        abstract_type: &str,
        object: &dyn Resolvable,
    ) -> Result<&TypeDescriptor, SchemaError> {
        let kind = object.kind();
        let unresolved = || SchemaError::UnresolvedPolymorphicType {
            abstract_type: abstract_type.to_string(),
            kind: kind.to_string(),
        };
        let name = kind_name(kind);
        let descriptor = self.types.get(name).ok_or_else(unresolved)?;
        if descriptor.kind() != TypeKind::Object || !self.is_possible_type(abstract_type, name) {
            return Err(unresolved());
        }
        tracing::trace!(abstract_type, concrete = name, "resolved concrete type");
        Ok(descriptor)
    }

    /// Find the record a global id points at.
    ///
    /// Ids naming an unknown type, or a type without the global id capability, are not found.
    pub fn object_from_id(
        &self,
        store: &Store,
        id: &str,
        separator: char,
    ) -> Result<Arc<Record>, FieldError> {
        let identifiable = GlobalId::decode(id, separator)
            .and_then(|global_id| self.types.get(&global_id.type_name))
            .and_then(TypeDescriptor::as_object)
            .is_some_and(ObjectType::supports_global_id);
        if !identifiable {
            return Err(FieldError::NotFound(id.to_string()));
        }
        global_id::find(store, id, separator)
    }

    /// Finish the registry before execution.
    ///
    /// Globally identifiable types get their `id` field and objects inherit the fields of the
    /// interfaces they implement. Every type reference, decorator and root type is then checked.
    /// Calling it again is harmless.
    pub fn complete(&mut self) -> Result<(), SchemaError> {
        for descriptor in self.types.values_mut() {
            if let TypeDefinition::Interface(interface) = &mut descriptor.definition {
                add_id_field(&descriptor.name, interface);
            }
        }

        let interfaces: HashMap<String, ObjectType> = self
            .types
            .values()
            .filter_map(|descriptor| match &descriptor.definition {
                TypeDefinition::Interface(interface) => {
                    Some((descriptor.name.clone(), interface.clone()))
                }
                _ => None,
            })
            .collect();
        let kinds: HashMap<String, TypeKind> = self
            .types
            .values()
            .map(|descriptor| (descriptor.name.clone(), descriptor.kind()))
            .collect();

        for descriptor in self.types.values_mut() {
            let name = descriptor.name.clone();
            let TypeDefinition::Object(object) = &mut descriptor.definition else {
                continue;
            };
            for interface_name in object.interfaces.clone() {
                let interface = interfaces.get(&interface_name).ok_or_else(|| {
                    match kinds.get(&interface_name) {
                        Some(kind) => SchemaError::InvalidSchema(format!(
                            "'{name}' implements '{interface_name}', which is a {kind}"
                        )),
                        None => SchemaError::UnknownType(interface_name.clone()),
                    }
                })?;
                object.global_id |= interface.global_id;
                for field in interface.fields.values() {
                    if !object.fields.contains_key(&field.name) {
                        object.fields.insert(field.name.clone(), field.clone());
                    }
                }
            }
            add_id_field(&name, object);
        }

        for descriptor in self.types.values() {
            self.check_type(descriptor, &kinds)?;
        }

        self.root_type(OperationKind::Query)?;
        if self.mutation_type.is_some() {
            self.root_type(OperationKind::Mutation)?;
        }
        Ok(())
    }

    fn check_type(
        &self,
        descriptor: &TypeDescriptor,
        kinds: &HashMap<String, TypeKind>,
    ) -> Result<(), SchemaError> {
        let check_reference = |ty: &FieldType, input: bool| -> Result<(), SchemaError> {
            let Some(name) = ty.inner_type_name() else {
                return Ok(());
            };
            let kind = kinds
                .get(name)
                .ok_or_else(|| SchemaError::UnknownType(name.to_string()))?;
            let allowed = if input {
                matches!(kind, TypeKind::Enum | TypeKind::Input | TypeKind::Scalar)
            } else {
                !matches!(kind, TypeKind::Input)
            };
            if !allowed {
                return Err(SchemaError::InvalidSchema(format!(
                    "'{}' uses {kind} type '{name}' in {} position",
                    descriptor.name,
                    if input { "input" } else { "output" }
                )));
            }
            Ok(())
        };
        let check_arguments = |arguments: &InputType| -> Result<(), SchemaError> {
            arguments
                .arguments()
                .try_for_each(|argument| check_reference(&argument.field_type, true))
        };

        match &descriptor.definition {
            TypeDefinition::Object(object) | TypeDefinition::Interface(object) => {
                for field in object.fields.values() {
                    check_reference(&field.field_type, false)?;
                    check_arguments(&field.arguments)?;
                    if let Some(unknown) = field
                        .decorators
                        .iter()
                        .find(|spec| !self.decorators.contains_key(&spec.name))
                    {
                        return Err(SchemaError::UnknownDecorator {
                            field: format!("{}.{}", descriptor.name, field.name),
                            decorator: unknown.name.clone(),
                        });
                    }
                }
            }
            TypeDefinition::Union(union) => {
                for member in &union.possible_types {
                    match kinds.get(member) {
                        Some(TypeKind::Object) => {}
                        Some(kind) => {
                            return Err(SchemaError::InvalidSchema(format!(
                                "union '{}' includes '{member}', which is a {kind}",
                                descriptor.name
                            )));
                        }
                        None => return Err(SchemaError::UnknownType(member.clone())),
                    }
                }
            }
            TypeDefinition::Input(input) => check_arguments(input)?,
            TypeDefinition::Enum(_) | TypeDefinition::Scalar(_) => {}
        }
        Ok(())
    }
}

fn add_id_field(owner: &str, object: &mut ObjectType) {
    if !object.global_id || object.fields.contains_key("id") {
        return;
    }
    let mut id = FieldDescriptor::new(owner, "id", FieldType::non_null(FieldType::Id));
    id.resolver = crate::spec::Resolver::Function(global_id::id_resolver());
    let mut fields = IndexMap::with_capacity(object.fields.len() + 1);
    fields.insert(id.name.clone(), id);
    fields.extend(object.fields.drain(..));
    object.fields = fields;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Resolved;

    struct Musician;
    impl Resolvable for Musician {}

    struct Stranger;
    impl Resolvable for Stranger {}

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema
            .register(
                TypeDescriptor::define_interface("NamedEntity", |t| {
                    t.field("name", "String!");
                })
                .unwrap(),
            )
            .unwrap();
        schema
            .register(
                TypeDescriptor::define_interface("GloballyIdentifiable", |t| {
                    t.global_id();
                })
                .unwrap(),
            )
            .unwrap();
        schema
            .register(
                TypeDescriptor::define_object("Musician", |t| {
                    t.implements("NamedEntity").implements("GloballyIdentifiable");
                    t.field("instrument", "String");
                })
                .unwrap(),
            )
            .unwrap();
        schema
            .register(
                TypeDescriptor::define_object("Stranger", |t| {
                    t.field("name", "String");
                })
                .unwrap(),
            )
            .unwrap();
        schema
            .register(
                TypeDescriptor::define_union("PerformingAct", |t| {
                    t.possible_type("Musician");
                })
                .unwrap(),
            )
            .unwrap();
        schema
            .register(
                TypeDescriptor::define_object("Query", |t| {
                    t.field("find", "GloballyIdentifiable")
                        .argument("id", "ID!");
                })
                .unwrap(),
            )
            .unwrap();
        schema
    }

    #[test]
    fn duplicate_names_are_rejected_across_kinds() {
        let mut schema = schema();
        let error = schema
            .register(
                TypeDescriptor::define_enum("Musician", |t| {
                    t.value("SOLO");
                })
                .unwrap(),
            )
            .unwrap_err();
        assert_eq!(error, SchemaError::DuplicateTypeName("Musician".to_string()));

        let error = schema
            .register(TypeDescriptor::define_object("String", |_| {}).unwrap())
            .unwrap_err();
        assert_eq!(error, SchemaError::DuplicateTypeName("String".to_string()));
    }

    #[test]
    fn lookup_unknown_type() {
        assert_eq!(
            schema().lookup("Trombone").unwrap_err(),
            SchemaError::UnknownType("Trombone".to_string())
        );
    }

    #[test]
    fn dispatch_through_interface_and_union() {
        let schema = schema();
        let concrete = schema
            .resolve_concrete_type("NamedEntity", &Musician)
            .unwrap();
        assert_eq!(concrete.name(), "Musician");
        assert_eq!(concrete.kind(), TypeKind::Object);

        let concrete = schema
            .resolve_concrete_type("PerformingAct", &Musician)
            .unwrap();
        assert_eq!(concrete.name(), "Musician");
    }

    #[test]
    fn dispatch_requires_a_possible_type() {
        let schema = schema();
        let error = schema
            .resolve_concrete_type("NamedEntity", &Stranger)
            .unwrap_err();
        assert!(matches!(
            error,
            SchemaError::UnresolvedPolymorphicType { ref abstract_type, .. } if abstract_type == "NamedEntity"
        ));

        let unregistered = serde_json_bytes::json!({"__typename": "Trombone"});
        let object = match unregistered {
            Value::Object(object) => object,
            _ => unreachable!(),
        };
        assert!(schema.resolve_concrete_type("NamedEntity", &object).is_err());
    }

    #[test]
    fn kind_names_drop_the_module_path() {
        assert_eq!(kind_name("schema_engine::jazz::models::Musician"), "Musician");
        assert_eq!(kind_name("Musician"), "Musician");
    }

    #[test]
    fn complete_adds_ids_and_interface_fields() {
        let mut schema = schema();
        schema.complete().unwrap();
        schema.complete().unwrap();

        let musician = schema.lookup("Musician").unwrap().as_object().unwrap();
        assert!(musician.supports_global_id());
        let names = musician.fields().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["instrument", "name", "id"]);
        assert_eq!(
            musician.field("id").unwrap().field_type,
            FieldType::non_null(FieldType::Id)
        );
    }

    #[test]
    fn complete_rejects_unknown_decorators() {
        let mut schema = schema();
        schema
            .register(
                TypeDescriptor::define_object("Band", |t| {
                    t.field("name", "String")
                        .decorate(crate::spec::DecoratorSpec::new("reverse"));
                })
                .unwrap(),
            )
            .unwrap();
        assert_eq!(
            schema.complete().unwrap_err(),
            SchemaError::UnknownDecorator {
                field: "Band.name".to_string(),
                decorator: "reverse".to_string(),
            }
        );

        schema.register_decorator("reverse", |value: Value, _: &crate::json_ext::Object| {
            Ok::<_, FieldError>(Value::String(
                value.as_str().unwrap_or_default().chars().rev().collect::<String>().into(),
            ))
        });
        schema.complete().unwrap();
    }

    #[test]
    fn complete_rejects_unknown_references() {
        let mut schema = schema();
        schema
            .register(
                TypeDescriptor::define_object("Band", |t| {
                    t.field("leader", "Bandleader");
                })
                .unwrap(),
            )
            .unwrap();
        assert_eq!(
            schema.complete().unwrap_err(),
            SchemaError::UnknownType("Bandleader".to_string())
        );
    }

    #[test]
    fn complete_requires_a_query_type() {
        let mut schema = Schema::new();
        assert_eq!(
            schema.complete().unwrap_err(),
            SchemaError::UnknownType("Query".to_string())
        );
    }

    #[test]
    fn union_members_must_be_objects() {
        let mut schema = schema();
        schema
            .register(
                TypeDescriptor::define_union("Anything", |t| {
                    t.possible_type("NamedEntity");
                })
                .unwrap(),
            )
            .unwrap();
        assert!(matches!(
            schema.complete(),
            Err(SchemaError::InvalidSchema(_))
        ));
    }

    #[test]
    fn object_from_id_requires_the_capability() {
        let mut schema = schema();
        schema.complete().unwrap();
        let store = Store::new();
        store.push("Stranger", Record::new("Stranger", "Sam"));
        store.push("Musician", Record::new("Musician", "Herbie Hancock"));

        assert_eq!(
            schema.object_from_id(&store, "Stranger/Sam", '/').unwrap_err(),
            FieldError::NotFound("Stranger/Sam".to_string())
        );
        let record = schema
            .object_from_id(&store, "Musician/Herbie Hancock", '/')
            .unwrap();
        assert_eq!(record.name(), "Herbie Hancock");
        assert!(matches!(record.property("name"), Some(Resolved::Value(_))));
    }
}
