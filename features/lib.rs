/*!
This crate decides how the columns of a dataframe become the numeric feature matrix a decision tree is trained on.

1. [`detect_column_types`](fn.detect_column_types.html) sorts columns into numeric and categorical roles by their storage kind.
2. [`create_preprocessor`](fn.create_preprocessor.html) builds a [`TransformationPlan`](struct.TransformationPlan.html) with a numeric group and a categorical group, each with the imputation and encoding steps its data needs.
3. [`TransformationPlan::fit`](struct.TransformationPlan.html#method.fit) learns fill values and categories from training data, producing a [`FittedPlan`](struct.FittedPlan.html) that transforms any view with the same columns into an `Array2<f32>`.
4. [`get_feature_names`](fn.get_feature_names.html) names every column of that matrix.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod impute;
mod names;
mod one_hot;
mod plan;
mod roles;

pub use self::impute::{FittedImputer, ImputeStrategy};
pub use self::names::get_feature_names;
pub use self::one_hot::FittedOneHotEncoder;
pub use self::plan::{
	create_preprocessor, FittedGroup, FittedPlan, FittedStep, GroupKind, Step, TransformationPlan,
	TransformerGroup,
};
pub use self::roles::{detect_column_types, ColumnRoles, ColumnTypeSets};

use sapling_dataframe::ColumnKind;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FeaturesError {
	#[error("column \"{0}\" does not exist")]
	ColumnNotFound(String),
	#[error("column \"{column}\" is a {kind} column, but only number columns can be numeric features")]
	NotANumberColumn { column: String, kind: ColumnKind },
	#[error("a {step} step cannot be applied to the values of the {group} group")]
	UnsupportedStep { step: Step, group: GroupKind },
	#[error("the {0} group ends without encoding its values as numbers")]
	NotEncoded(GroupKind),
}

#[cfg(test)]
pub(crate) fn dataframe_from_csv(csv: &str) -> sapling_dataframe::DataFrame {
	sapling_dataframe::DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv.to_owned())),
		sapling_dataframe::FromCsvOptions {
			infer_options: sapling_dataframe::InferOptions {
				enum_max_unique_values: 3,
			},
			..Default::default()
		},
	)
	.unwrap()
}

/// `age` and `income` are number columns, `income` with a missing value. `color` is an enum column with a missing value, `note` is a text column, and `empty` is an unknown column.
#[cfg(test)]
pub(crate) fn test_dataframe() -> sapling_dataframe::DataFrame {
	dataframe_from_csv(
		"age,color,note,empty,income\n\
		31,red,a,,100\n\
		45,blue,b,,\n\
		27,red,c,,300\n\
		52,,d,,250\n",
	)
}
