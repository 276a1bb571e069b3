use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{CashSnapshot, OrderStatus, Period, Role, VoucherStatus, VoucherTotals, VoucherType},
    dto::{
        auth::{LoginRequest, LoginResponse},
        invoices::{InvoiceSort, InvoiceSummary, PrintFilter, UpdateInvoiceRequest},
        orders::{CreateOrderRequest, OrderList, OrderWithItems},
        payments::{DailyPayment, DailyPayments, PaymentReceipt, RecordPaymentRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reports::{
            BilanLine, BilanReport, CloseDayRequest, DashboardStats, MonthlySales, ProductProfit,
            RecentPayment, RecentTransaction, TopProduct, TransactionKind,
        },
        sales::{AddCartItemRequest, CartCleared, CartMovement, CartView},
        users::{CreateUserRequest, UpdateUserRequest, UserList},
        vouchers::{
            CreateVoucherRequest, DailyVoucherDetails, UpdateVoucherRequest, VoucherDetail,
            VoucherList, VoucherSummary,
        },
    },
    models::{CartLine, CashClosing, Order, OrderItem, Payment, Product, User, Voucher},
    response::{ApiResponse, Meta},
    routes::{
        auth, bilan, dashboard, health, invoices, orders, params, payments, products, profits,
        sales, statistics, users, vouchers,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "POS back-office API", description = "Sales, invoices, vouchers and cash drawer"),
    paths(
        health::health_check,
        auth::login,
        auth::refresh,
        auth::me,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        products::list_products,
        products::list_low_stock,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        sales::get_cart,
        sales::add_item,
        sales::remove_item,
        sales::clear_cart,
        orders::create_order,
        orders::list_orders,
        invoices::list_invoices,
        invoices::invoice_summary,
        invoices::get_invoice,
        invoices::update_invoice,
        payments::lookup_invoice,
        payments::record_payment,
        payments::daily_payments,
        payments::cash_drawer,
        vouchers::list_vouchers,
        vouchers::create_voucher,
        vouchers::lookup_voucher,
        vouchers::update_voucher,
        vouchers::voucher_summary,
        vouchers::daily_voucher_details,
        bilan::daily_bilan,
        dashboard::dashboard_stats,
        dashboard::recent_transactions,
        dashboard::close_day,
        statistics::monthly_sales,
        statistics::top_products,
        statistics::recent_payments,
        profits::product_profits
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            VoucherType,
            VoucherStatus,
            Period,
            VoucherTotals,
            CashSnapshot,
            User,
            Product,
            CartLine,
            Order,
            OrderItem,
            Payment,
            Voucher,
            CashClosing,
            LoginRequest,
            LoginResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddCartItemRequest,
            CartView,
            CartMovement,
            CartCleared,
            CreateOrderRequest,
            OrderList,
            OrderWithItems,
            InvoiceSort,
            PrintFilter,
            InvoiceSummary,
            UpdateInvoiceRequest,
            RecordPaymentRequest,
            PaymentReceipt,
            DailyPayment,
            DailyPayments,
            CreateVoucherRequest,
            UpdateVoucherRequest,
            VoucherList,
            VoucherSummary,
            VoucherDetail,
            DailyVoucherDetails,
            BilanLine,
            BilanReport,
            DashboardStats,
            TransactionKind,
            RecentTransaction,
            CloseDayRequest,
            MonthlySales,
            TopProduct,
            RecentPayment,
            ProductProfit,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CashSnapshot>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Login and session endpoints"),
        (name = "Users", description = "Account management, admin only"),
        (name = "Products", description = "Catalogue and stock"),
        (name = "Sales", description = "Sale in progress; each line reserves stock"),
        (name = "Orders", description = "Invoice creation"),
        (name = "Invoices", description = "Invoice listing, printing and status"),
        (name = "Payments", description = "Cash collection and drawer balance"),
        (name = "Vouchers", description = "Expense, output and entry vouchers"),
        (name = "Dashboard", description = "Daily figures and day closing"),
        (name = "Statistics", description = "Sales statistics"),
        (name = "Reports", description = "Bilan and profits"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
