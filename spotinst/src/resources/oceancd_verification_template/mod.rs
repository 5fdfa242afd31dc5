//! spotinst_oceancd_verification_template

pub mod metrics;

use crate::resources::oceancd_rollout_spec::{args_schema, expand_args, flatten_args};
use crate::sdk::oceancd::VerificationTemplate;
use crate::sdk::Nullable;
use commons::{
    FieldError, FieldName, FieldRegistry, FieldRegistryBuilder, GenericField, ResourceType, Schema,
};

pub const TYPE_NAME: &str = "spotinst_oceancd_verification_template";

pub const OCEANCD_VERIFICATION_TEMPLATE: ResourceType =
    ResourceType("oceancd_verification_template");

pub const NAME: FieldName = FieldName("name");
pub const ARGS: FieldName = FieldName("args");

fn field(name: FieldName, schema: Schema) -> GenericField<VerificationTemplate> {
    GenericField::new(OCEANCD_VERIFICATION_TEMPLATE, name, schema)
}

pub fn setup(fields: &mut FieldRegistryBuilder<VerificationTemplate>) {
    fields.register(
        field(NAME, Schema::string().required().force_new().build())
            .on_read(|template, data| data.set(&NAME, template.name.cloned().unwrap_or_default()))
            .on_create(|data, template| {
                template.name = Nullable::from_option(data.get_string(&NAME)?);
                Ok(())
            })
            .on_update(|_, _| Err(FieldError::update_not_allowed(NAME.as_str()))),
    );

    fields.register(
        field(ARGS, args_schema())
            .on_read(|template, data| {
                let args = template
                    .args
                    .value()
                    .map(|args| flatten_args(args))
                    .unwrap_or_default();
                data.set_blocks(&ARGS, args)
            })
            .on_create(|data, template| {
                if let Some(args) = data.decode(&ARGS)?.filter(|a: &Vec<_>| !a.is_empty()) {
                    template.args = Nullable::Value(expand_args(args));
                }
                Ok(())
            })
            .on_update(|data, template| {
                let args = data
                    .decode(&ARGS)?
                    .filter(|a: &Vec<_>| !a.is_empty())
                    .map(expand_args);
                template.args = Nullable::or_null(args);
                Ok(())
            }),
    );
}

pub fn registry() -> FieldRegistry<VerificationTemplate> {
    let mut fields = FieldRegistry::builder();
    setup(&mut fields);
    metrics::setup(&mut fields);
    fields.build()
}
