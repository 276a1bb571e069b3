pub mod cash_closings;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;
pub mod sale_cart_items;
pub mod users;
pub mod vouchers;

pub use cash_closings::Entity as CashClosings;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use products::Entity as Products;
pub use sale_cart_items::Entity as SaleCartItems;
pub use users::Entity as Users;
pub use vouchers::Entity as Vouchers;
