use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, Type};

use super::util::{filter_flags, from_json, input_rows, seed_flag, segment_signature, tables_flag};
use crate::ops;
use crate::SegmentsPlugin;

pub struct Sales;

impl PluginCommand for Sales {
    type Plugin = SegmentsPlugin;

    fn name(&self) -> &str {
        "segments sales"
    }

    fn description(&self) -> &str {
        "Sales and revenue per segment at one taxonomy level"
    }

    fn signature(&self) -> Signature {
        segment_signature(Signature::build(self.name()))
            .input_output_type(Type::table(), Type::table())
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["sales", "revenue", "segment", "rollup"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"[[laboratory sales price category]; [Sanofi 10 "2.50" "Douleur & Fièvre"] [Pfizer 3 "12.90" "Beauté"]] | segments sales --level category"#,
            description: "Units sold and revenue per category",
            result: None,
        }]
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
        let result = ops::op_sales(&rows, &level, &filter, enrich, &tables, seed)
            .map_err(LabeledError::new)?;

        Ok(PipelineData::Value(from_json(&result, head), None))
    }
}
