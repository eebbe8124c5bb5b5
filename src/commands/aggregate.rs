use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, Type};

use super::util::{filter_flags, from_json, input_rows, seed_flag, segment_signature, tables_flag};
use crate::ops;
use crate::SegmentsPlugin;

pub struct Aggregate;

impl PluginCommand for Aggregate {
    type Plugin = SegmentsPlugin;

    fn name(&self) -> &str {
        "segments aggregate"
    }

    fn description(&self) -> &str {
        "Group products into a segment tree at one taxonomy level, with summary statistics"
    }

    fn signature(&self) -> Signature {
        segment_signature(Signature::build(self.name()))
            .input_output_type(Type::table(), Type::record())
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["aggregate", "group", "segment", "treemap", "taxonomy"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"[[id laboratory sales category]; [1 Sanofi 10 "Douleur & Fièvre"] [2 Sanofi 5 "Douleur & Fièvre"] [3 Pfizer 3 "Beauté"]] | segments aggregate --level category"#,
                description: "Group already-classified products by category",
                result: None,
            },
            Example {
                example: "open products.json | segments aggregate --enrich --level family --within-level universe --within Médicaments",
                description: "Drill down into one universe and group its products by family",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &SegmentsPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let level: String = call
            .get_flag::<String>("level")?
            .unwrap_or_else(|| "category".into());
        let filter = filter_flags(call)?;
        let enrich = call.has_flag("enrich")?;
        let tables = tables_flag(call.get_flag("taxonomy")?)?;
        let seed = seed_flag(call.get_flag::<i64>("seed")?);
        let head = call.head;

        let rows = input_rows(input);
        let result = ops::op_aggregate(&rows, &level, &filter, enrich, &tables, seed)
            .map_err(LabeledError::new)?;

        Ok(PipelineData::Value(from_json(&result, head), None))
    }
}
