// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Order-specific code lives under `order/`. Storage and broker adapters are
// reached only through the traits in `crate::store` and `crate::messaging`.
//
// ============================================================================

pub mod order;
