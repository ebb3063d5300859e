//! Field matching and conversion planning
//!
//! A [`Conversion`] pairs a source schema with a target schema. Planning walks
//! the target's fields, pairs each with a source field by case-insensitive name
//! and type compatibility, and picks the coercion that turns one into the
//! other. Nested structs get their own conversion, discovered breadth-first by
//! [`plan_conversions`]; every conversion is planned in both directions.
//!
//! The plan is plain data. Rendering it is [`crate::emit`]'s job.

use crate::error::{GenError, GenResult, ResultExt};
use crate::naming::to_snake_case;
use schemabridge_core::{DataField, DataKind, DataType, NamedType, Type, describe_fields};
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// One conversion function to generate.
#[derive(Debug, Clone, Copy)]
pub struct Conversion<'a> {
    /// Outermost conversion of a translation
    pub root: bool,
    /// Internal to external when true
    pub to: bool,
    /// External system name the function names are built from
    pub name: &'a str,
    pub source: &'a DataType,
    pub target: &'a DataType,
}

/// A value expression in a conversion body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// `binding.field`
    Read { binding: String, field: String },
    /// Wrap into an optional value
    MakePtr(Box<Assignment>),
    /// Read an optional value, falling back to `default`
    GetOrDefault {
        value: Box<Assignment>,
        default: ZeroValue,
    },
    /// Wrap a primitive into the named type `ty`
    CastUp {
        ty: Type,
        value: Box<Assignment>,
        optional: bool,
    },
    /// Take the primitive out of a named type
    CastDown { value: Box<Assignment>, optional: bool },
    /// Call a sub-conversion
    Convert {
        function: String,
        value: Box<Assignment>,
    },
}

/// Zero value of a type, used as the fallback when reading optionals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZeroValue {
    EmptyString,
    Integer,
    Float,
    Bool,
    Char,
    None,
    /// Named wrapper around the primitive's zero value
    Wrapped { ty: Type, inner: Box<ZeroValue> },
    Default,
}

impl ZeroValue {
    pub fn of(nt: &NamedType) -> ZeroValue {
        if nt.is_pointer() {
            return ZeroValue::None;
        }
        if let Some(primitive) = &nt.primitive {
            return ZeroValue::Wrapped {
                ty: nt.ty.clone(),
                inner: Box::new(ZeroValue::of(&NamedType::new("", primitive.clone()))),
            };
        }
        match nt.ty.as_str() {
            "String" => ZeroValue::EmptyString,
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64" | "u128"
            | "usize" => ZeroValue::Integer,
            "f32" | "f64" => ZeroValue::Float,
            "bool" => ZeroValue::Bool,
            "char" => ZeroValue::Char,
            _ => ZeroValue::Default,
        }
    }
}

/// Assignment of one target field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAssignment {
    pub field: String,
    pub value: Assignment,
}

/// Everything needed to render one conversion function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub method: String,
    pub source: NamedType,
    pub target: NamedType,
    /// Return early when the (optional) source is absent
    pub nil_guard: bool,
    pub fields: Vec<FieldAssignment>,
}

impl<'a> Conversion<'a> {
    pub fn new(name: &'a str, to: bool, source: &'a DataType, target: &'a DataType) -> Self {
        Self {
            root: true,
            to,
            name,
            source,
            target,
        }
    }

    pub fn direction(&self) -> &'static str {
        if self.to { "to" } else { "from" }
    }

    /// Function name: `to_atlas` for the root, `complex_subtype_to_atlas` below it.
    pub fn method(&self) -> String {
        let name = to_snake_case(self.name);
        if self.root {
            format!("{}_{name}", self.direction())
        } else {
            format!(
                "{}_{}_{name}",
                to_snake_case(self.target.named.ty.base()),
                self.direction()
            )
        }
    }

    pub fn reverse(&self) -> Conversion<'a> {
        Conversion {
            root: self.root,
            to: !self.to,
            name: self.name,
            source: self.target,
            target: self.source,
        }
    }

    fn sub_conversion(&self, source: &'a DataField, target: &'a DataField) -> Conversion<'a> {
        Conversion {
            root: false,
            to: self.to,
            name: self.name,
            source: &source.data,
            target: &target.data,
        }
    }

    /// One child conversion per struct field of the target.
    pub fn sub_conversions(&self) -> GenResult<Vec<Conversion<'a>>> {
        let candidates: Vec<&'a DataField> = self.source.fields().iter().collect();
        let mut subs = Vec::new();
        for field in self.target.fields().iter().filter(|field| field.is_struct()) {
            let (_, source) = find_source_field(&candidates, field).map_err(|_| GenError::NoStructPair {
                field: field.to_string(),
                candidates: describe_fields(&candidates),
            })?;
            subs.push(self.sub_conversion(source, field));
        }
        Ok(subs)
    }

    /// Plan the body of this conversion.
    pub fn plan(&self) -> GenResult<ConversionPlan> {
        if !self.target.is_struct() {
            return Err(GenError::NotAStruct(self.target.named.to_string()));
        }

        let binding = self.source.named.name.clone();
        let mut remaining: Vec<&'a DataField> = self.source.fields().iter().collect();
        let mut fields = Vec::with_capacity(self.target.fields().len());
        for field in self.target.fields() {
            let (rest, source) = find_source_field(&remaining, field)?;
            remaining = rest;

            let read = Assignment::Read {
                binding: binding.clone(),
                field: source.field_name.clone(),
            };
            let value = if field.is_struct() {
                Assignment::Convert {
                    function: self.sub_conversion(source, field).method(),
                    value: Box::new(read),
                }
            } else {
                assign(field.named(), source.named(), read)
                    .context_with(|| format!("field {}", field.field_name))?
            };
            fields.push(FieldAssignment {
                field: field.field_name.clone(),
                value,
            });
        }

        Ok(ConversionPlan {
            method: self.method(),
            source: self.source.named.clone(),
            target: self.target.named.clone(),
            nil_guard: self.source.named.is_pointer(),
            fields,
        })
    }
}

/// Find the source field for `target` and return the candidates left after
/// consuming it. The first compatible candidate wins.
pub fn find_source_field<'a>(
    candidates: &[&'a DataField],
    target: &DataField,
) -> GenResult<(Vec<&'a DataField>, &'a DataField)> {
    let found = candidates.iter().position(|candidate| {
        candidate.field_name.eq_ignore_ascii_case(&target.field_name) && compatible(target, candidate)
    });

    match found {
        Some(idx) => {
            let mut remaining = candidates.to_vec();
            let source = remaining.remove(idx);
            debug_assert!(
                remaining.len() < candidates.len(),
                "matched field {} was not consumed",
                source.field_name
            );
            Ok((remaining, source))
        }
        None => Err(GenError::NoCorrespondingField {
            field: target.to_string(),
            candidates: describe_fields(candidates),
        }),
    }
}

/// Simple fields must be assignable; struct fields pair up by name alone
/// because their two sides are distinct types by construction.
fn compatible(target: &DataField, candidate: &DataField) -> bool {
    match (target.kind(), candidate.kind()) {
        (DataKind::SimpleField, DataKind::SimpleField) => target.named().assignable_from(candidate.named()),
        (DataKind::Struct, DataKind::Struct) => true,
        _ => false,
    }
}

/// Coerce `value`, bound as `source`, into `target`.
///
/// Rules are tried in order and recurse until the types are identical.
pub fn assign(target: &NamedType, source: &NamedType, value: Assignment) -> GenResult<Assignment> {
    if source.ty == target.ty {
        return Ok(value);
    }

    if target.primitive.as_ref() == Some(&source.ty.dereference())
        && let Some(primitive) = target.as_primitive()
    {
        let inner = assign(&primitive, source, value)?;
        return Ok(Assignment::CastUp {
            ty: target.ty.dereference(),
            value: Box::new(inner),
            optional: target.is_pointer(),
        });
    }

    if target.is_pointer() && !source.is_pointer() {
        let inner = assign(&target.dereference(), source, value)?;
        return Ok(Assignment::MakePtr(Box::new(inner)));
    }

    if source.is_pointer() && !target.is_pointer() {
        let deref = source.dereference();
        let unwrapped = Assignment::GetOrDefault {
            value: Box::new(value),
            default: ZeroValue::of(&deref),
        };
        return assign(target, &deref, unwrapped);
    }

    if source.primitive.as_ref() == Some(&target.ty.dereference())
        && let Some(primitive) = source.as_primitive()
    {
        let down = Assignment::CastDown {
            value: Box::new(value),
            optional: source.is_pointer(),
        };
        return assign(target, &primitive, down);
    }

    Err(GenError::CannotAssign {
        from: source.to_string(),
        to: target.to_string(),
    })
}

/// Plan `root` and every nested conversion it needs, each followed by its
/// reverse, in breadth-first discovery order.
///
/// A nested type used by several fields is planned once. Two different type
/// pairs that would share a function name, in either direction, are rejected.
pub fn plan_conversions(root: Conversion<'_>) -> GenResult<Vec<ConversionPlan>> {
    let mut queue = VecDeque::from([root]);
    let mut planned: BTreeMap<String, (Type, Type)> = BTreeMap::new();
    record(&mut planned, &root)?;
    record(&mut planned, &root.reverse())?;

    let mut plans = Vec::new();
    while let Some(conversion) = queue.pop_front() {
        for sub in conversion.sub_conversions()? {
            let forward_new = record(&mut planned, &sub)?;
            let reverse_new = record(&mut planned, &sub.reverse())?;
            if forward_new && reverse_new {
                queue.push_back(sub);
            } else {
                debug!(method = %sub.method(), "reusing planned conversion");
            }
        }

        let forward = conversion.plan().context_with(|| conversion.method())?;
        let reverse = conversion.reverse();
        let backward = reverse.plan().context_with(|| reverse.method())?;
        debug!(
            forward = %forward.method,
            reverse = %backward.method,
            fields = forward.fields.len(),
            "planned conversion"
        );
        plans.push(forward);
        plans.push(backward);
    }

    Ok(plans)
}

/// Claim the function name of `conversion`. Returns false when the same type
/// pair already holds it.
fn record(planned: &mut BTreeMap<String, (Type, Type)>, conversion: &Conversion<'_>) -> GenResult<bool> {
    let method = conversion.method();
    let pair = (conversion.source.named.ty.clone(), conversion.target.named.ty.clone());
    match planned.get(&method) {
        Some(existing) if *existing == pair => Ok(false),
        Some(existing) => Err(GenError::ConflictingConversion {
            method,
            first: format!("{} -> {}", existing.0, existing.1),
            second: format!("{} -> {}", pair.0, pair.1),
        }),
        None => {
            planned.insert(method, pair);
            Ok(true)
        }
    }
}
