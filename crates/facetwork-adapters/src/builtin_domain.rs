//! Built-in demo domain.
//!
//! A small order-entry model used when no class directory is configured.
//! It exercises every facet factory in the default programming model:
//! accessors and setters, `hide`/`disable`/`validate`/`choices`/`default`
//! supporting methods, annotations, titles, and object validation.

use facetwork_core::domain::{
    Annotation, ClassDescriptor, InvocationError, MethodBody, MethodDescriptor, Nature,
    ObjectAdapter, ParameterDescriptor, TypeRef, Value, When, Where,
};

use crate::authorizor::{Permission, RoleTableAuthorizor};

pub const CUSTOMER: &str = "com.acme.Customer";
pub const ORDER: &str = "com.acme.Order";
pub const ORDER_LINE: &str = "com.acme.OrderLine";

/// Every class in the demo domain.
pub fn all_classes() -> Vec<ClassDescriptor> {
    vec![customer(), order(), order_line()]
}

/// Role table shipped with the demo: customer e-mail addresses are only
/// visible to `sales` and editable by `admin`.
pub fn authorizor() -> RoleTableAuthorizor {
    RoleTableAuthorizor::new()
        .grant(format!("{CUSTOMER}#email"), "sales", Permission::View)
        .grant(format!("{CUSTOMER}#email"), "admin", Permission::Edit)
}

fn getter(name: &str, ret: TypeRef, field: &'static str) -> MethodDescriptor {
    MethodDescriptor::new(name, ret).body(MethodBody::query(move |o, _| Ok(o.field(field))))
}

fn setter(name: &str, param: &str, ty: TypeRef, field: &'static str) -> MethodDescriptor {
    MethodDescriptor::new(name, TypeRef::Void)
        .param(ParameterDescriptor::new(param, ty))
        .body(MethodBody::command(move |o, args| {
            o.set_field(field, args.first().cloned().unwrap_or_default());
            Ok(Value::Null)
        }))
}

fn reason(vetoed: bool, text: &str) -> Value {
    if vetoed {
        Value::from(text)
    } else {
        Value::Null
    }
}

fn customer() -> ClassDescriptor {
    ClassDescriptor::new(CUSTOMER)
        .annotated(Annotation::DomainObject {
            nature: Nature::Entity,
            logical_type_name: Some("acme.Customer".into()),
        })
        .annotated(Annotation::DescribedAs {
            value: "Someone who places orders".into(),
        })
        .method(getter("getName", TypeRef::Text, "name"))
        .method(setter("setName", "name", TypeRef::Text, "name"))
        .method(
            getter("getEmail", TypeRef::Text, "email")
                .annotated(Annotation::Optional)
                .annotated(Annotation::MaxLength { value: 40 }),
        )
        .method(setter("setEmail", "email", TypeRef::Text, "email"))
        .method(
            MethodDescriptor::new("validateEmail", TypeRef::Text)
                .param(ParameterDescriptor::new("email", TypeRef::Text))
                .body(MethodBody::query(|_, args| {
                    let invalid = args
                        .first()
                        .and_then(Value::as_text)
                        .is_some_and(|email| !email.contains('@'));
                    Ok(reason(invalid, "Not a valid e-mail address"))
                })),
        )
        .method(getter("getOrders", TypeRef::Collection(ORDER.into()), "orders"))
        .method(
            MethodDescriptor::new("title", TypeRef::Text)
                .body(MethodBody::query(|o, _| Ok(o.field("name")))),
        )
}

fn order() -> ClassDescriptor {
    ClassDescriptor::new(ORDER)
        .annotated(Annotation::DomainObject {
            nature: Nature::Entity,
            logical_type_name: Some("acme.Order".into()),
        })
        .method(getter("getCustomer", TypeRef::Reference(CUSTOMER.into()), "customer"))
        .method(setter("setCustomer", "customer", TypeRef::Reference(CUSTOMER.into()), "customer"))
        .method(getter("getQuantity", TypeRef::Integer, "quantity"))
        .method(setter("setQuantity", "quantity", TypeRef::Integer, "quantity"))
        .method(
            MethodDescriptor::new("disableQuantity", TypeRef::Text).body(MethodBody::query(
                |o, _| Ok(reason(o.is_persistent(), "Cannot change quantity once placed")),
            )),
        )
        .method(
            MethodDescriptor::new("validateQuantity", TypeRef::Text)
                .param(ParameterDescriptor::new("quantity", TypeRef::Integer))
                .body(MethodBody::query(|_, args| {
                    let non_positive = args.first().and_then(Value::as_int).is_some_and(|q| q <= 0);
                    Ok(reason(non_positive, "Quantity must be positive"))
                })),
        )
        .method(
            MethodDescriptor::new("choicesQuantity", TypeRef::Integer)
                .body(MethodBody::query(|_, _| {
                    Ok(Value::List(vec![Value::Int(1), Value::Int(5), Value::Int(10)]))
                })),
        )
        .method(
            MethodDescriptor::new("defaultQuantity", TypeRef::Integer)
                .body(MethodBody::query(|_, _| Ok(Value::Int(1)))),
        )
        .method(
            getter("getNote", TypeRef::Text, "note")
                .annotated(Annotation::Optional)
                .annotated(Annotation::MaxLength { value: 20 })
                .annotated(Annotation::Hidden {
                    when: When::Always,
                    where_: Where::AllTables,
                }),
        )
        .method(setter("setNote", "note", TypeRef::Text, "note"))
        .method(
            getter("getStatus", TypeRef::Text, "status").annotated(Annotation::Disabled {
                when: When::Always,
                reason: Some("Status is maintained by the order workflow".into()),
            }),
        )
        .method(getter("getLines", TypeRef::Collection(ORDER_LINE.into()), "lines"))
        .method(
            MethodDescriptor::new("place", TypeRef::Void)
                .param(
                    ParameterDescriptor::new("reference", TypeRef::Text)
                        .annotated(Annotation::MaxLength { value: 12 }),
                )
                .body(MethodBody::command(|o, args| {
                    if o.is_persistent() {
                        return Err(InvocationError::Failed {
                            method: "place".into(),
                            reason: "order already placed".into(),
                        });
                    }
                    let reference = args.first().and_then(Value::as_text).unwrap_or("new");
                    o.mark_persistent(reference.to_string());
                    o.set_field("status", Value::from("placed"));
                    Ok(Value::Null)
                })),
        )
        .method(
            MethodDescriptor::new("disablePlace", TypeRef::Text).body(MethodBody::query(|o, _| {
                Ok(reason(o.is_persistent(), "Order has already been placed"))
            })),
        )
        .method(
            MethodDescriptor::new("cancel", TypeRef::Void)
                .annotated(Annotation::Hidden {
                    when: When::UntilPersisted,
                    where_: Where::Anywhere,
                })
                .body(MethodBody::command(|o, _| {
                    o.set_field("status", Value::from("cancelled"));
                    Ok(Value::Null)
                })),
        )
        .method(
            MethodDescriptor::new("validate", TypeRef::Text).body(MethodBody::query(|o, _| {
                Ok(reason(o.field("customer").is_null(), "An order needs a customer"))
            })),
        )
        .method(
            MethodDescriptor::new("title", TypeRef::Text).body(MethodBody::query(|o, _| {
                Ok(Value::Text(format!("Order {}", order_label(o))))
            })),
        )
        .method(
            MethodDescriptor::new("recalculate", TypeRef::Void).annotated(Annotation::Programmatic),
        )
}

fn order_label(order: &ObjectAdapter) -> String {
    if order.is_persistent() {
        order.oid().to_string()
    } else {
        "(draft)".into()
    }
}

fn order_line() -> ClassDescriptor {
    ClassDescriptor::new(ORDER_LINE)
        .annotated(Annotation::DomainObject {
            nature: Nature::ViewModel,
            logical_type_name: None,
        })
        .annotated(Annotation::Immutable { reason: None })
        .method(getter("getProduct", TypeRef::Text, "product"))
        .method(getter("getAmount", TypeRef::Integer, "amount"))
}
