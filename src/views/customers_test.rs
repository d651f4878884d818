use super::*;

fn named(name: &str, id: &str) -> Customer {
    Customer {
        customer_id: Some(id.into()),
        name: name.into(),
        email: None,
        phone: None,
        address: None,
        status: None,
        created_at: None,
    }
}

#[test]
fn sort_by_name_ignores_case_and_is_stable() {
    let mut customers = vec![named("ravi", "1"), named("Asha", "2"), named("asha", "3"), named("Meera", "4")];
    sort_by_name(&mut customers);
    let ids: Vec<_> = customers.iter().filter_map(|c| c.customer_id.as_deref()).collect();
    assert_eq!(ids, ["2", "3", "4", "1"]);
}

#[test]
fn validate_new_trims_fields() {
    let customer = validate_new(NewCustomer {
        name: " Asha ".into(),
        email: "asha@example.com".into(),
        phone: " 98765 ".into(),
        address: "12 Lake Rd".into(),
    })
    .unwrap();
    assert_eq!(customer.name, "Asha");
    assert_eq!(customer.phone, "98765");
}

#[test]
fn validate_new_names_first_missing_field() {
    let err = validate_new(NewCustomer { name: "Asha".into(), email: "  ".into(), ..NewCustomer::default() }).unwrap_err();
    assert_eq!(err, CustomerFormError::Missing("email"));
    assert_eq!(err.to_string(), "email is required");
}

#[test]
fn validate_update_drops_blank_fields() {
    let update = validate_update(CustomerUpdate {
        phone: Some(" 555 ".into()),
        address: Some("   ".into()),
        ..CustomerUpdate::default()
    })
    .unwrap();
    assert_eq!(update.phone.as_deref(), Some("555"));
    assert_eq!(update.address, None);
}

#[test]
fn validate_update_refuses_empty() {
    let err = validate_update(CustomerUpdate { name: Some(String::new()), ..CustomerUpdate::default() }).unwrap_err();
    assert_eq!(err, CustomerFormError::EmptyUpdate);
}
