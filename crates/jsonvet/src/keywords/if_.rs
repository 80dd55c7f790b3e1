use crate::{
    compiler,
    error::{no_error, ErrorIterator, ValidationError},
    keywords::CompilationResult,
    node::SchemaNode,
    paths::LazyLocation,
    validator::Validate,
};
use serde_json::{Map, Value};

/// `if`/`then`/`else`.
///
/// The condition is probed in boolean mode; only the chosen branch can
/// surface errors.
pub(crate) struct IfThenElseValidator {
    condition: SchemaNode,
    then_: Option<SchemaNode>,
    else_: Option<SchemaNode>,
}

impl IfThenElseValidator {
    #[inline]
    pub(crate) fn compile<'a>(
        ctx: &compiler::Context,
        schema: &'a Value,
        then_: Option<&'a Value>,
        else_: Option<&'a Value>,
    ) -> CompilationResult<'a> {
        let condition = {
            let cctx = ctx.new_at_location("if");
            compiler::compile(&cctx, cctx.as_resource_ref(schema))?
        };
        let then_ = match then_ {
            Some(subschema) => {
                let tctx = ctx.new_at_location("then");
                Some(compiler::compile(&tctx, tctx.as_resource_ref(subschema))?)
            }
            None => None,
        };
        let else_ = match else_ {
            Some(subschema) => {
                let ectx = ctx.new_at_location("else");
                Some(compiler::compile(&ectx, ectx.as_resource_ref(subschema))?)
            }
            None => None,
        };
        Ok(Box::new(IfThenElseValidator {
            condition,
            then_,
            else_,
        }))
    }

    fn branch(&self, instance: &Value) -> Option<&SchemaNode> {
        if self.condition.is_valid(instance) {
            self.then_.as_ref()
        } else {
            self.else_.as_ref()
        }
    }
}

impl Validate for IfThenElseValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        self.branch(instance)
            .map_or(true, |node| node.is_valid(instance))
    }

    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        match self.branch(instance) {
            Some(node) => node.validate(instance, location),
            None => Ok(()),
        }
    }

    fn iter_errors<'i>(&self, instance: &'i Value, location: &LazyLocation) -> ErrorIterator<'i> {
        match self.branch(instance) {
            Some(node) => node.iter_errors(instance, location),
            None => no_error(),
        }
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    parent: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    let then_ = parent.get("then");
    let else_ = parent.get("else");
    if then_.is_none() && else_.is_none() {
        // A bare `if` asserts nothing
        return None;
    }
    Some(IfThenElseValidator::compile(ctx, schema, then_, else_))
}
