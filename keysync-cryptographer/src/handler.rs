use keysync_types::{BaseTransaction, ModelTypeSet, NigoriSpecifics};

/// Sink for nigori node updates owned by the transaction layer.
///
/// The cryptographer forwards these calls unchanged and never interprets
/// the payloads.
pub trait NigoriHandler: Send {
    /// Apply a nigori node received from the server.
    fn apply_nigori_update(&mut self, nigori: &NigoriSpecifics, trans: &mut dyn BaseTransaction);

    /// Write the locally encrypted types into an outgoing nigori node.
    fn update_nigori_from_encrypted_types(
        &self,
        nigori: &mut NigoriSpecifics,
        trans: &dyn BaseTransaction,
    );

    /// Types currently marked for encryption.
    fn encrypted_types(&self) -> ModelTypeSet;
}
