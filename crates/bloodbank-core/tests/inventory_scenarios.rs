//! End-to-end inventory scenarios: deduction, donation merge, fulfilment
//! and emergency search against one store.

use bloodbank_core::db::{Database, InventoryRepo};
use bloodbank_core::models::{
    BloodGroup, Hospital, InventoryBatch, NewDonation, NewHospital, NewRequest,
    NewUser, RequestStatus, User,
};
use bloodbank_core::{
    BloodBankError, Directory, DonationReconciler, EmergencyLocator, InventoryLedger,
    RequestFulfiller,
};
use chrono::{Duration, Utc};

fn register_hospital(db: &Database, name: &str, latitude: f64, longitude: f64) -> Hospital {
    Directory::new(db)
        .register_hospital(NewHospital {
            name: name.to_string(),
            address: format!("{} campus", name),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            pincode: None,
            contact: "020-555-0100".to_string(),
            latitude,
            longitude,
        })
        .unwrap()
}

fn register_user(db: &Database, json: &str) -> User {
    let form: NewUser = serde_json::from_str(json).unwrap();
    Directory::new(db).register_user(form).unwrap()
}

fn add_batch(db: &Database, hospital: &Hospital, group: BloodGroup, qty: u32, days: i64) -> InventoryBatch {
    let batch = InventoryBatch::new(
        hospital.id.clone(),
        group,
        qty,
        Utc::now() + Duration::days(days),
    );
    db.insert_batch(&batch).unwrap();
    batch
}

#[test]
fn test_deduct_six_from_five_and_three() {
    let db = Database::open_in_memory().unwrap();
    let h = register_hospital(&db, "General", 18.5, 73.8);
    let first = add_batch(&db, &h, BloodGroup::APositive, 5, 2);
    let second = add_batch(&db, &h, BloodGroup::APositive, 3, 10);

    let deduction = InventoryLedger::new(&db)
        .deduct(&h.id, BloodGroup::APositive, 6)
        .unwrap();

    assert_eq!(deduction.deducted, 6);
    assert_eq!(deduction.remaining, 2);
    assert!(db.get_batch(&first.id).unwrap().is_none());
    assert_eq!(db.get_batch(&second.id).unwrap().unwrap().quantity, 2);
}

#[test]
fn test_deduct_more_than_available() {
    let db = Database::open_in_memory().unwrap();
    let h = register_hospital(&db, "General", 18.5, 73.8);
    add_batch(&db, &h, BloodGroup::APositive, 5, 2);
    add_batch(&db, &h, BloodGroup::APositive, 3, 10);
    let before = db.list_batches_for_hospital(&h.id).unwrap();

    let err = InventoryLedger::new(&db)
        .deduct(&h.id, BloodGroup::APositive, 100)
        .unwrap_err();

    assert!(matches!(
        err,
        BloodBankError::InsufficientStock { available: 8, required: 100 }
    ));
    assert_eq!(db.list_batches_for_hospital(&h.id).unwrap(), before);
}

#[test]
fn test_expired_stock_is_never_deducted() {
    let db = Database::open_in_memory().unwrap();
    let h = register_hospital(&db, "General", 18.5, 73.8);
    let stale = add_batch(&db, &h, BloodGroup::ONegative, 50, -1);
    add_batch(&db, &h, BloodGroup::ONegative, 2, 5);

    let ledger = InventoryLedger::new(&db);
    let err = ledger.deduct(&h.id, BloodGroup::ONegative, 3).unwrap_err();
    assert!(matches!(
        err,
        BloodBankError::InsufficientStock { available: 2, required: 3 }
    ));
    assert_eq!(db.get_batch(&stale.id).unwrap().unwrap().quantity, 50);
}

#[test]
fn test_two_donations_merge_into_one_batch() {
    let db = Database::open_in_memory().unwrap();
    let h = register_hospital(&db, "General", 18.5, 73.8);
    let donor_a = register_user(&db, r#"{"name":"Asha","bloodGroup":"B+"}"#);
    let donor_b = register_user(&db, r#"{"name":"Vikram","bloodGroup":"B+"}"#);

    let reconciler = DonationReconciler::new(&db);
    let early = Utc::now() - Duration::days(7);
    let late = Utc::now() - Duration::days(1);
    for (donor, date, units) in [(&donor_a, early, 1), (&donor_b, late, 2)] {
        reconciler
            .record_donation(NewDonation {
                donor_id: donor.id.clone(),
                hospital_id: Some(h.id.clone()),
                camp_id: None,
                date,
                units_donated: units,
                blood_group: BloodGroup::BPositive,
            })
            .unwrap();
    }

    let batches = db.list_batches_for_hospital(&h.id).unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].quantity, 3);
    assert_eq!(batches[0].expiry_date, late + Duration::days(42));

    let directory = Directory::new(&db);
    for donor in [&donor_a, &donor_b] {
        assert!(!directory.get_user(&donor.id).unwrap().is_eligible);
    }
}

#[test]
fn test_donation_with_expired_batch_opens_new_batch() {
    let db = Database::open_in_memory().unwrap();
    let h = register_hospital(&db, "General", 18.5, 73.8);
    let donor = register_user(&db, r#"{"name":"Asha","bloodGroup":"B+"}"#);
    let stale = add_batch(&db, &h, BloodGroup::BPositive, 4, -2);

    let receipt = DonationReconciler::new(&db)
        .record_donation(NewDonation {
            donor_id: donor.id.clone(),
            hospital_id: Some(h.id.clone()),
            camp_id: None,
            date: Utc::now(),
            units_donated: 1,
            blood_group: BloodGroup::BPositive,
        })
        .unwrap();

    assert!(!receipt.merged);
    assert_ne!(receipt.batch_id.as_deref(), Some(stale.id.as_str()));
    assert_eq!(db.list_batches_for_hospital(&h.id).unwrap().len(), 2);
}

#[test]
fn test_emergency_search_prefers_nearest_sufficient_hospital() {
    let db = Database::open_in_memory().unwrap();
    let h = register_hospital(&db, "H", 18.5, 73.8);
    let j = register_hospital(&db, "J", 18.68, 73.8);
    let k = register_hospital(&db, "K", 18.545, 73.8);
    add_batch(&db, &h, BloodGroup::BNegative, 3, 10);
    add_batch(&db, &j, BloodGroup::BNegative, 15, 10);
    add_batch(&db, &k, BloodGroup::BNegative, 2, 10);

    let result = EmergencyLocator::new(&db)
        .locate(&h.id, BloodGroup::BNegative, 10)
        .unwrap();

    assert!(!result.has_enough);
    assert_eq!(result.current_quantity, 3);
    let nearest = result.nearest_hospital.expect("J has enough stock");
    assert_eq!(nearest.hospital.id, j.id);
    assert!((nearest.distance - 20.0).abs() < 0.1);
    assert!(result
        .all_available_hospitals
        .iter()
        .all(|candidate| candidate.hospital.id != k.id));
}

#[test]
fn test_request_lifecycle_with_fulfilment() {
    let db = Database::open_in_memory().unwrap();
    let h = register_hospital(&db, "General", 18.5, 73.8);
    let patient = register_user(&db, r#"{"name":"Ravi","bloodGroup":"AB-","userType":"PATIENT"}"#);
    add_batch(&db, &h, BloodGroup::AbNegative, 2, 3);

    let fulfiller = RequestFulfiller::new(&db);
    let request = fulfiller
        .create_request(NewRequest {
            receiver_id: patient.id.clone(),
            hospital_id: None,
            blood_group: BloodGroup::AbNegative,
            units_required: 3,
            is_emergency: true,
            latitude: None,
            longitude: None,
        })
        .unwrap();

    // Not enough yet: stays pending
    assert!(matches!(
        fulfiller.fulfill(&request.id, &h.id),
        Err(BloodBankError::InsufficientStock { available: 2, required: 3 })
    ));
    assert_eq!(fulfiller.get_request(&request.id).unwrap().status, RequestStatus::Pending);

    add_batch(&db, &h, BloodGroup::AbNegative, 4, 8);
    let fulfilled = fulfiller.fulfill(&request.id, &h.id).unwrap();
    assert_eq!(fulfilled.status, RequestStatus::Fulfilled);
    assert_eq!(
        InventoryLedger::new(&db)
            .available_units(&h.id, BloodGroup::AbNegative)
            .unwrap(),
        3
    );
    assert_eq!(fulfiller.list_for_hospital(&h.id).unwrap().len(), 1);
}

#[test]
fn test_stock_reports() {
    let db = Database::open_in_memory().unwrap();
    let h = register_hospital(&db, "General", 18.5, 73.8);
    let ledger = InventoryLedger::new(&db);

    let mut low = add_batch(&db, &h, BloodGroup::OPositive, 2, 5);
    low.min_quantity = 4;
    db.update_batch(&low).unwrap();
    add_batch(&db, &h, BloodGroup::APositive, 9, 5);

    let summary = ledger.stock_summary(&h.id).unwrap();
    assert_eq!(summary.len(), 2);

    let alerts = ledger.low_stock(&h.id).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].blood_group, BloodGroup::OPositive);
    assert_eq!(alerts[0].threshold, 4);
}
