//! A compiled schema scope.
use crate::{
    compiler::Context,
    error::ErrorIterator,
    keywords::BoxedValidator,
    paths::{LazyLocation, Location},
    validator::Validate,
    ValidationError,
};
use serde_json::Value;
use std::fmt;

/// One node of the compiled validator tree: the keyword checks of a single
/// schema scope, executed in the fixed dispatch order.
pub(crate) struct SchemaNode {
    validators: Box<[BoxedValidator]>,
    location: Location,
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaNode")
            .field("location", &self.location)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl SchemaNode {
    pub(crate) fn new(ctx: &Context<'_>, mut validators: Vec<BoxedValidator>) -> SchemaNode {
        validators.shrink_to_fit();
        SchemaNode {
            validators: validators.into_boxed_slice(),
            location: ctx.location().clone(),
        }
    }

    pub(crate) fn location(&self) -> &Location {
        &self.location
    }

    pub(crate) fn validators(&self) -> impl ExactSizeIterator<Item = &BoxedValidator> {
        self.validators.iter()
    }
}

impl Validate for SchemaNode {
    fn is_valid(&self, instance: &Value) -> bool {
        // Single-validator nodes are the common leaf case; skipping the
        // iterator machinery shaves measurable time off deep trees.
        if let [validator] = &*self.validators {
            validator.is_valid(instance)
        } else {
            self.validators.iter().all(|v| v.is_valid(instance))
        }
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        for validator in &*self.validators {
            validator.validate(instance, location)?;
        }
        Ok(())
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        match &*self.validators {
            [validator] => validator.iter_errors(instance, location),
            validators => Box::new(
                validators
                    .iter()
                    .flat_map(|v| v.iter_errors(instance, location))
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
        }
    }
}
