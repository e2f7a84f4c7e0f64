mod helpers;

mod cart_test;
mod guard_test;
mod order_test;
mod product_test;
mod router_test;
