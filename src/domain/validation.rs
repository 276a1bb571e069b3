//! Input checks that run before any write is attempted.

use super::{Amount, DomainError, DomainResult};

pub fn validate_product_name(name: &str) -> DomainResult<()> {
    if name.trim().chars().count() < 2 {
        return Err(DomainError::Invalid(
            "Le nom du produit doit contenir au moins 2 caractères".into(),
        ));
    }
    Ok(())
}

pub fn validate_product_prices(purchase_price: Amount, selling_price: Amount) -> DomainResult<()> {
    if purchase_price < 0 || selling_price < 0 {
        return Err(DomainError::Invalid("Les prix doivent être positifs".into()));
    }
    if selling_price <= purchase_price {
        return Err(DomainError::Invalid(
            "Le prix de vente doit être supérieur au prix d'achat".into(),
        ));
    }
    Ok(())
}

pub fn validate_stock(stock: i32) -> DomainResult<()> {
    if stock < 0 {
        return Err(DomainError::Invalid("Le stock ne peut pas être négatif".into()));
    }
    Ok(())
}

pub fn validate_discount(discount: i32) -> DomainResult<()> {
    if !(0..=100).contains(&discount) {
        return Err(DomainError::Invalid(
            "La réduction doit être comprise entre 0 et 100%".into(),
        ));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i32) -> DomainResult<()> {
    if quantity < 1 {
        return Err(DomainError::Invalid("La quantité doit être au moins 1".into()));
    }
    Ok(())
}

/// Checks a sale line against the stock currently known for the product.
pub fn validate_sale_item(quantity: i32, discount: i32, available: i32) -> DomainResult<()> {
    validate_quantity(quantity)?;
    validate_discount(discount)?;
    if quantity > available {
        return Err(insufficient_stock(available));
    }
    Ok(())
}

pub fn insufficient_stock(available: i32) -> DomainError {
    DomainError::Invalid(format!("Seulement {} unités disponibles", available.max(0)))
}

pub fn validate_voucher(amount: Amount, description: &str) -> DomainResult<()> {
    if amount <= 0 {
        return Err(DomainError::Invalid("Le montant doit être positif".into()));
    }
    if description.trim().chars().count() < 5 {
        return Err(DomainError::Invalid(
            "La description doit contenir au moins 5 caractères".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> DomainResult<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(DomainError::Invalid("Adresse email invalide".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < 6 {
        return Err(DomainError::Invalid(
            "Le mot de passe doit contenir au moins 6 caractères".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selling_price_must_exceed_purchase_price() {
        assert!(validate_product_prices(1_000, 1_500).is_ok());
        assert!(validate_product_prices(1_500, 1_500).is_err());
        assert!(validate_product_prices(2_000, 1_500).is_err());
        assert!(validate_product_prices(-1, 1_500).is_err());
    }

    #[test]
    fn sale_item_respects_known_stock() {
        assert!(validate_sale_item(3, 0, 10).is_ok());
        assert!(validate_sale_item(10, 100, 10).is_ok());
        assert_eq!(
            validate_sale_item(11, 0, 10),
            Err(DomainError::Invalid("Seulement 10 unités disponibles".into()))
        );
        assert!(validate_sale_item(0, 0, 10).is_err());
        assert!(validate_sale_item(1, -1, 10).is_err());
        assert!(validate_sale_item(1, 101, 10).is_err());
    }

    #[test]
    fn voucher_needs_positive_amount_and_description() {
        assert!(validate_voucher(500_000, "Achat de fournitures").is_ok());
        assert!(validate_voucher(0, "Achat de fournitures").is_err());
        assert!(validate_voucher(100, "  ab  ").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("admin@example.com").is_ok());
        assert!(validate_email("admin.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn stock_and_name() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-3).is_err());
        assert!(validate_product_name("Riz").is_ok());
        assert!(validate_product_name(" R ").is_err());
    }
}
