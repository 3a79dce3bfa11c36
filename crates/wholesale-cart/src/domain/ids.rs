//! Deterministic stream identifiers.

use uuid::Uuid;

const CART_NAMESPACE: Uuid = Uuid::from_u128(0x5c1e_7a3b_92d4_4f0e_8b6a_1d2c_3e4f_5a60);
const CHECKOUT_NAMESPACE: Uuid = Uuid::from_u128(0x9e2f_41c8_6b7a_4d35_a1f0_c3b2_7d8e_9f01);

/// Cart stream for an owner. One owner, one cart.
#[must_use]
pub fn cart_id_for(owner_id: Uuid) -> Uuid {
    Uuid::new_v5(&CART_NAMESPACE, owner_id.as_bytes())
}

/// Order stream produced by checking out `cart_id` at `cart_version`.
///
/// A given cart version can only ever become one order.
#[must_use]
pub fn checkout_order_id(cart_id: Uuid, cart_version: i64) -> Uuid {
    let mut name = Vec::with_capacity(24);
    name.extend_from_slice(cart_id.as_bytes());
    name.extend_from_slice(&cart_version.to_be_bytes());
    Uuid::new_v5(&CHECKOUT_NAMESPACE, &name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_id_is_stable_per_owner() {
        let owner = Uuid::new_v4();

        assert_eq!(cart_id_for(owner), cart_id_for(owner));
        assert_ne!(cart_id_for(owner), cart_id_for(Uuid::new_v4()));
        assert_ne!(cart_id_for(owner), owner);
    }

    #[test]
    fn test_checkout_order_id_changes_with_version() {
        let cart_id = cart_id_for(Uuid::new_v4());

        assert_eq!(checkout_order_id(cart_id, 3), checkout_order_id(cart_id, 3));
        assert_ne!(checkout_order_id(cart_id, 3), checkout_order_id(cart_id, 4));
    }
}
