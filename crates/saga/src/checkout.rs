//! Checkout saga step name constants.

/// Step name recorded before the first real step runs.
pub const STEP_INIT: &str = "init";

/// Step name: Load the user's cart.
pub const STEP_FETCH_CART: &str = "fetch_cart";

/// Step name: Reject tours the user already owns.
pub const STEP_CHECK_OWNERSHIP: &str = "check_ownership";

/// Step name: Verify every tour exists and is purchasable.
pub const STEP_CHECK_AVAILABILITY: &str = "check_availability";

/// Step name: Charge the cart total through the payment gateway.
pub const STEP_PROCESS_PAYMENT: &str = "process_payment";

/// Step name: Create the token/purchase-record pair for every item.
pub const STEP_CREATE_PURCHASES: &str = "create_purchases";

/// Step name: Clear the cart. Always last; never compensated.
pub const STEP_CLEAR_CART: &str = "clear_cart";

/// Compensation step name: delete created tokens and purchase records.
pub const STEP_COMPENSATE_PURCHASES: &str = "compensate_purchases";

/// Compensation step name: refund the processed payment.
pub const STEP_COMPENSATE_PAYMENT: &str = "compensate_payment";
