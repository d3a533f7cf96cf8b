//! Add/edit form
//!
//! Inputs are kept as the raw text a user typed; validation turns them into
//! a [`ProductDraft`] or one message per invalid field.

use mobilemart_products::{Product, ProductDraft};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Form inputs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Image,
    Price,
    OldPrice,
    Discount,
    Rating,
    Reviews,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::Name,
        FormField::Image,
        FormField::Price,
        FormField::OldPrice,
        FormField::Discount,
        FormField::Rating,
        FormField::Reviews,
        FormField::Description,
    ];

    /// Wire name of the field
    pub fn key(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Image => "image",
            FormField::Price => "price",
            FormField::OldPrice => "old_price",
            FormField::Discount => "discount",
            FormField::Rating => "rating",
            FormField::Reviews => "reviews",
            FormField::Description => "description",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Product Name",
            FormField::Image => "Image URL",
            FormField::Price => "Price ($)",
            FormField::OldPrice => "Old Price ($)",
            FormField::Discount => "Discount (%)",
            FormField::Rating => "Rating (1–5)",
            FormField::Reviews => "Total Reviews",
            FormField::Description => "Description",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One message per invalid field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: FormField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&messages.join(", "))
    }
}

/// Whether the form creates a product or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit { id: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    mode: FormMode,
    values: BTreeMap<FormField, String>,
    errors: FieldErrors,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductForm {
    /// Empty form for a new product
    pub fn new() -> Self {
        let values = [
            (FormField::Name, ""),
            (FormField::Image, ""),
            (FormField::Price, "0"),
            (FormField::OldPrice, "0"),
            (FormField::Discount, "0%"),
            (FormField::Rating, "5"),
            (FormField::Reviews, "0"),
            (FormField::Description, ""),
        ]
        .into_iter()
        .map(|(field, value)| (field, value.to_string()))
        .collect();

        Self {
            mode: FormMode::Add,
            values,
            errors: FieldErrors::default(),
        }
    }

    /// Form prefilled from an existing product
    pub fn edit(product: &Product) -> Self {
        let draft = &product.draft;
        let mut form = Self::new();
        form.mode = FormMode::Edit { id: product.id };
        form.set(FormField::Name, draft.name.as_str());
        form.set(FormField::Image, draft.image.as_str());
        form.set(FormField::Price, draft.price.to_string());
        form.set(FormField::OldPrice, draft.old_price.to_string());
        form.set(FormField::Discount, draft.discount.as_str());
        form.set(FormField::Rating, draft.rating.to_string());
        form.set(FormField::Reviews, draft.reviews.to_string());
        form.set(
            FormField::Description,
            draft.description.clone().unwrap_or_default(),
        );
        form
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add Product",
            FormMode::Edit { .. } => "Edit Product",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add Product",
            FormMode::Edit { .. } => "Update Product",
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn value(&self, field: FormField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Errors from the last [`ProductForm::submit`]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Validate and remember the outcome for display.
    pub fn submit(&mut self) -> Result<ProductDraft, FieldErrors> {
        let result = self.validate();
        self.errors = match &result {
            Ok(_) => FieldErrors::default(),
            Err(errors) => errors.clone(),
        };
        result
    }

    /// Check every field; all failures are reported together.
    pub fn validate(&self) -> Result<ProductDraft, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.value(FormField::Name).trim().to_string();
        if name.is_empty() {
            errors.insert(FormField::Name, "Product name is required");
        }

        let price = self.positive_amount(FormField::Price, "Price", &mut errors);
        let old_price = self.positive_amount(FormField::OldPrice, "Old price", &mut errors);

        let discount = self.value(FormField::Discount).trim().to_string();
        if discount.is_empty() {
            errors.insert(FormField::Discount, "Discount is required");
        }

        let rating = match self.value(FormField::Rating).trim().parse::<u8>() {
            Ok(rating) if (1..=5).contains(&rating) => rating,
            _ => {
                errors.insert(FormField::Rating, "Rating must be between 1 and 5");
                0
            }
        };

        let reviews_input = self.value(FormField::Reviews).trim();
        let reviews = match reviews_input.parse::<u32>() {
            Ok(reviews) => reviews,
            Err(_) if reviews_input.parse::<i64>().map_or(false, |n| n < 0) => {
                errors.insert(FormField::Reviews, "Reviews cannot be negative");
                0
            }
            Err(_) => {
                errors.insert(FormField::Reviews, "Reviews must be a valid number");
                0
            }
        };

        let image = self.value(FormField::Image).trim().to_string();
        if Url::parse(&image).is_err() {
            errors.insert(FormField::Image, "Image must be a valid URL");
        }

        let description = self.value(FormField::Description).trim();
        let description = (!description.is_empty()).then(|| description.to_string());

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProductDraft {
            name,
            price,
            old_price,
            discount,
            rating,
            reviews,
            description,
            image,
        })
    }

    fn positive_amount(&self, field: FormField, label: &str, errors: &mut FieldErrors) -> f64 {
        match self.value(field).trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount > 0.0 => amount,
            Ok(amount) if amount.is_finite() => {
                errors.insert(field, &format!("{} must be greater than 0", label));
                0.0
            }
            _ => {
                errors.insert(field, &format!("{} must be a valid number", label));
                0.0
            }
        }
    }
}
