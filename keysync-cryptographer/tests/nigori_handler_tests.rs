//! Forwarding of nigori node updates to the registered handler.

mod support;

use keysync_cryptographer::{
    BaseTransaction, CryptographerError, ModelType, ModelTypeSet, NigoriHandler, NigoriSpecifics,
};
use std::sync::{Arc, Mutex};
use support::{new_cryptographer, params};

struct TestTransaction;

impl BaseTransaction for TestTransaction {}

#[derive(Default)]
struct Recorded {
    applied: Vec<NigoriSpecifics>,
    updates: usize,
}

struct RecordingHandler {
    recorded: Arc<Mutex<Recorded>>,
    encrypted_types: ModelTypeSet,
}

impl NigoriHandler for RecordingHandler {
    fn apply_nigori_update(&mut self, nigori: &NigoriSpecifics, _trans: &mut dyn BaseTransaction) {
        self.recorded.lock().unwrap().applied.push(nigori.clone());
    }

    fn update_nigori_from_encrypted_types(
        &self,
        nigori: &mut NigoriSpecifics,
        _trans: &dyn BaseTransaction,
    ) {
        self.recorded.lock().unwrap().updates += 1;
        nigori.encrypted_types.put_all(&self.encrypted_types);
    }

    fn encrypted_types(&self) -> ModelTypeSet {
        self.encrypted_types.clone()
    }
}

fn handler() -> (RecordingHandler, Arc<Mutex<Recorded>>) {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let mut encrypted_types = ModelType::sensitive_types();
    encrypted_types.put(ModelType::Bookmarks);
    (
        RecordingHandler {
            recorded: recorded.clone(),
            encrypted_types,
        },
        recorded,
    )
}

#[test]
fn calls_without_handler_fail() {
    let mut c = new_cryptographer();
    let mut trans = TestTransaction;
    assert!(matches!(
        c.apply_nigori_update(&NigoriSpecifics::default(), &mut trans),
        Err(CryptographerError::NoNigoriHandler)
    ));
    assert!(matches!(
        c.encrypted_types(),
        Err(CryptographerError::NoNigoriHandler)
    ));
}

#[test]
fn apply_forwards_payload_unchanged() {
    let mut c = new_cryptographer();
    c.add_key(&params("pw1")).unwrap();
    let (handler, recorded) = handler();
    c.set_nigori_handler(Box::new(handler));

    let nigori = NigoriSpecifics {
        encryption_keybag: c.get_keys().unwrap(),
        encrypted_types: ModelType::sensitive_types(),
        encrypt_everything: true,
    };
    let mut trans = TestTransaction;
    c.apply_nigori_update(&nigori, &mut trans).unwrap();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.applied, vec![nigori]);
}

#[test]
fn outgoing_node_gets_handler_encrypted_types() {
    let mut c = new_cryptographer();
    let (handler, recorded) = handler();
    c.set_nigori_handler(Box::new(handler));

    let mut nigori = NigoriSpecifics::default();
    c.update_nigori_from_encrypted_types(&mut nigori, &TestTransaction)
        .unwrap();

    assert!(nigori.encrypted_types.has(ModelType::Bookmarks));
    assert!(nigori.encrypted_types.has(ModelType::Passwords));
    assert_eq!(recorded.lock().unwrap().updates, 1);
    assert_eq!(c.encrypted_types().unwrap(), nigori.encrypted_types);
}
