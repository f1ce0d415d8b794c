//! Manifests and the demo domain through the full metamodel bootstrap.

use std::{fs, sync::Arc};

use facetwork_adapters::{ClassManifestLoader, InMemoryClassRegistry, RoleTableAuthorizor, builtin_domain};
use facetwork_core::{
    application::SpecificationLoader,
    domain::{
        InteractionInitiatedBy, ObjectAdapter, ProgrammingModel, Session, UserMemento, Value,
        Where,
    },
    prelude::WrapperFactory,
};
use tempfile::TempDir;

const ORDER: &str = r#"
[class]
name = "com.acme.Order"
nature = "entity"

[[methods]]
name = "getQuantity"
returns = "integer"
body = { kind = "field", field = "quantity" }

[[methods]]
name = "setQuantity"
parameters = [{ name = "quantity", type = "integer" }]
body = { kind = "set_field", field = "quantity" }

[[methods]]
name = "disableQuantity"
returns = "text"
body = { kind = "when_persistent", value = "Cannot change quantity once placed" }

[[methods]]
name = "getCustomer"
returns = "ref:com.acme.Customer"
body = { kind = "field", field = "customer" }
"#;

const CUSTOMER: &str = r#"
[class]
name = "com.acme.Customer"

[[methods]]
name = "getName"
returns = "text"
body = { kind = "field", field = "name" }

[[methods]]
name = "getOrders"
returns = "list:com.acme.Order"
body = { kind = "field", field = "orders" }
"#;

fn loader_over(registry: InMemoryClassRegistry) -> Arc<SpecificationLoader> {
    Arc::new(SpecificationLoader::new(
        Arc::new(registry),
        Arc::new(ProgrammingModel::with_defaults()),
    ))
}

#[test]
fn manifest_directory_bootstraps() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("order.toml"), ORDER).unwrap();
    fs::write(temp.path().join("customer.toml"), CUSTOMER).unwrap();

    let registry = ClassManifestLoader::new(temp.path()).load_registry().unwrap();
    let loader = loader_over(registry);
    let specs = loader.init_metamodel().unwrap();
    assert_eq!(specs.len(), 2);

    let order = loader.load_specification("com.acme.Order").unwrap();
    let quantity = order.property("quantity").unwrap();
    let session = Session::permit_all(UserMemento::new("sven"));

    let placed = ObjectAdapter::persistent("com.acme.Order", "7");
    let result = quantity
        .is_usable(&placed, &session, InteractionInitiatedBy::User, Where::Anywhere)
        .unwrap();
    assert_eq!(result.reason(), Some("Cannot change quantity once placed"));

    let draft = ObjectAdapter::transient("com.acme.Order");
    assert!(quantity
        .is_usable(&draft, &session, InteractionInitiatedBy::User, Where::Anywhere)
        .unwrap()
        .is_allowed());
}

#[test]
fn orphaned_supporting_method_fails_bootstrap() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("order.toml"),
        format!("{ORDER}\n[[methods]]\nname = \"hideDiscount\"\nreturns = \"boolean\"\n"),
    )
    .unwrap();
    fs::write(temp.path().join("customer.toml"), CUSTOMER).unwrap();

    let loader = loader_over(ClassManifestLoader::new(temp.path()).load_registry().unwrap());
    let err = loader.init_metamodel().unwrap_err();
    assert!(err.to_string().contains("com.acme.Order#hideDiscount()"));
}

#[test]
fn demo_domain_is_valid() {
    let loader = loader_over(InMemoryClassRegistry::with_builtin().unwrap());
    let specs = loader.init_metamodel().unwrap();
    assert_eq!(specs.len(), 3);

    let order = loader.load_specification(builtin_domain::ORDER).unwrap();
    let actions: Vec<_> = order.actions().iter().map(|a| a.id()).collect();
    assert_eq!(actions, vec!["place", "cancel"]);
    assert!(order.unclaimed_supporting_methods().is_empty());
}

#[test]
fn demo_role_table_hides_email() {
    let loader = loader_over(InMemoryClassRegistry::with_builtin().unwrap());
    loader.init_metamodel().unwrap();
    let customer = loader.load_specification(builtin_domain::CUSTOMER).unwrap();
    let email = customer.property("email").unwrap();
    let target = ObjectAdapter::persistent(builtin_domain::CUSTOMER, "c-1");

    let guest = Session::new(UserMemento::new("guest"), Arc::new(builtin_domain::authorizor()));
    let result = email
        .is_visible(&target, &guest, InteractionInitiatedBy::User, Where::Anywhere)
        .unwrap();
    assert_eq!(result.reason(), Some("Not authorized to view"));

    let framework = email
        .is_visible(&target, &guest, InteractionInitiatedBy::Framework, Where::Anywhere)
        .unwrap();
    assert!(framework.is_allowed());

    let sales = Session::new(
        UserMemento::new("sam").with_role("sales"),
        Arc::new(RoleTableAuthorizor::from_toml(
            "[[rules]]\nmember = \"com.acme.Customer#email\"\nrole = \"sales\"\npermission = \"view\"\n",
        )
        .unwrap()),
    );
    assert!(email
        .is_visible(&target, &sales, InteractionInitiatedBy::User, Where::Anywhere)
        .unwrap()
        .is_allowed());
}

#[test]
fn demo_order_lifecycle_through_wrapper() {
    let loader = loader_over(InMemoryClassRegistry::with_builtin().unwrap());
    let session = Session::permit_all(UserMemento::new("sven"));
    let mut order = ObjectAdapter::transient(builtin_domain::ORDER);

    {
        let mut wrapped = WrapperFactory::new(Arc::clone(&loader))
            .wrap(&mut order, &session)
            .unwrap();
        wrapped.set_property("quantity", Value::Int(5)).unwrap();
        assert!(wrapped.set_property("quantity", Value::Int(0)).is_err());
        assert!(wrapped.validate().is_err());
        wrapped
            .invoke_action("place", &[Value::from("A-100")])
            .unwrap();
    }

    assert!(order.is_persistent());
    assert_eq!(order.field("quantity"), Value::Int(5));
    assert_eq!(order.field("status"), Value::from("placed"));

    let mut wrapped = WrapperFactory::new(loader).wrap(&mut order, &session).unwrap();
    let err = wrapped.set_property("quantity", Value::Int(6)).unwrap_err();
    assert!(err.to_string().contains("Cannot change quantity once placed"));
    assert_eq!(wrapped.title().unwrap(), "Order A-100");
}

#[test]
fn demo_order_line_is_read_only() {
    let loader = loader_over(InMemoryClassRegistry::with_builtin().unwrap());
    loader.init_metamodel().unwrap();
    let line = loader.load_specification(builtin_domain::ORDER_LINE).unwrap();
    let session = Session::permit_all(UserMemento::new("sven"));
    let target = ObjectAdapter::transient(builtin_domain::ORDER_LINE);

    for id in ["product", "amount"] {
        let result = line
            .property(id)
            .unwrap()
            .is_usable(&target, &session, InteractionInitiatedBy::User, Where::Anywhere)
            .unwrap();
        assert_eq!(result.reason(), Some("Immutable"), "{id}");
    }
}

#[test]
fn immutable_manifest_flag_disables_members() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("receipt.toml"),
        r#"
[class]
name = "com.acme.Receipt"
immutable = true

[[methods]]
name = "getTotal"
returns = "integer"
body = { kind = "field", field = "total" }

[[methods]]
name = "getLines"
returns = "list:com.acme.Receipt"
body = { kind = "field", field = "lines" }
"#,
    )
    .unwrap();

    let loader = loader_over(ClassManifestLoader::new(temp.path()).load_registry().unwrap());
    loader.init_metamodel().unwrap();
    let receipt = loader.load_specification("com.acme.Receipt").unwrap();
    let session = Session::permit_all(UserMemento::new("sven"));
    let target = ObjectAdapter::persistent("com.acme.Receipt", "r-1");

    let total = receipt
        .property("total")
        .unwrap()
        .is_usable(&target, &session, InteractionInitiatedBy::User, Where::Anywhere)
        .unwrap();
    assert_eq!(total.reason(), Some("Immutable"));

    let lines = receipt
        .collection("lines")
        .unwrap()
        .is_usable(&target, &session, InteractionInitiatedBy::User, Where::Anywhere)
        .unwrap();
    assert!(lines.is_vetoed());
}
