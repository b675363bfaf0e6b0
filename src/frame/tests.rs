//! End-to-end behaviour of the containers through the base mixins.

use super::*;
use crate::algorithms::{Keep, Mapper, NaAction, Side};
use crate::base::{
    AggFunc, AggResult, FactorizedUniques, IndexOpsMixin, Positions, Selection, SelectionMixin,
};
use crate::ops::{errstate, geterr, ErrAction, ErrState, Operand};
use crate::scalar::Scalar;
use crate::types::DType;
use crate::values::ArrayValues;

fn frame() -> DataFrame {
    DataFrame::new(vec![
        ("a", ArrayValues::from_i64(vec![1, 2, 3])),
        ("b", ArrayValues::from_f64(vec![4.0, 5.0, 6.0])),
    ])
    .unwrap()
}

//==================================================================================
// Selection
//==================================================================================

#[test]
fn test_scenario_selection() {
    let c = ColumnSelector::new(frame());

    let one = c.get_item("a").unwrap();
    assert_eq!(one.ndim(), 1);
    assert_eq!(one.selection(), Some(&Selection::Label("a".into())));

    let two = c.get_item(["a", "b"]).unwrap();
    assert_eq!(two.ndim(), 2);
    assert_eq!(two.selection_list(), vec!["a".to_string(), "b".to_string()]);

    let err = c.get_item(["z"]).unwrap_err();
    assert!(matches!(err, crate::error::TabulaError::KeyError(_)));
    assert!(err.to_string().contains("'z'"));
}

#[test]
fn test_selection_does_not_mutate_original() {
    let c = ColumnSelector::new(frame());
    let _view = c.get_item("b").unwrap();
    assert!(c.selection().is_none());
    assert!(c.selection_list().is_empty());
    assert_eq!(c.ndim(), 2);
}

#[test]
fn test_double_selection_rejected() {
    let c = ColumnSelector::new(frame());
    let view = c.get_item(["a", "b"]).unwrap();
    for key in [Selection::from("a"), Selection::from(vec!["a"]), Selection::from("zzz")] {
        let err = view.get_item(key).unwrap_err();
        assert_eq!(
            err.to_string(),
            "IndexError: Column(s) ['a', 'b'] already selected"
        );
    }
}

#[test]
fn test_missing_keys_named_exactly() {
    let c = ColumnSelector::new(frame());
    let err = c.get_item(vec!["a", "z", "b", "q", "z"]).unwrap_err();
    assert_eq!(err.to_string(), "KeyError: Columns not found: 'z', 'q'");

    let err = c.get_item("nope").unwrap_err();
    assert_eq!(err.to_string(), "KeyError: Column not found: nope");
}

#[test]
fn test_single_item_list_is_one_dimensional() {
    let c = ColumnSelector::new(frame());
    let view = c.get_item(vec!["b"]).unwrap();
    assert_eq!(view.ndim(), 1);
    match view.aggregate(AggFunc::Sum).unwrap() {
        AggResult::Scalar(s) => assert_eq!(s, Scalar::Float(15.0)),
        other => panic!("expected a scalar, got {:?}", other),
    }
}

#[test]
fn test_aggregate_over_columns() {
    let c = ColumnSelector::new(frame());
    match c.get_item(["b", "a"]).unwrap().agg(AggFunc::Max).unwrap() {
        AggResult::Series(s) => {
            assert_eq!(s.index_labels(), vec![Scalar::Str("b".into()), Scalar::Str("a".into())]);
            assert_eq!(s.to_list(), vec![Scalar::Float(6.0), Scalar::Float(3.0)]);
        }
        other => panic!("expected a series, got {:?}", other),
    }
    match c.get_item("a").unwrap().aggregate(AggFunc::Mean).unwrap() {
        AggResult::Scalar(s) => assert_eq!(s, Scalar::Float(2.0)),
        other => panic!("expected a scalar, got {:?}", other),
    }
}

#[test]
fn test_exclusions_and_selected_obj() {
    let c = ColumnSelector::new(frame()).with_exclusions(vec!["a"]);
    match c.obj_with_exclusions().unwrap() {
        FrameObject::Frame(f) => assert_eq!(f.columns(), &["b".to_string()]),
        other => panic!("unexpected {:?}", other),
    }
    match c.get_item("a").unwrap().selected_obj().unwrap() {
        FrameObject::Series(s) => assert_eq!(s.name(), Some("a")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_selection_overrides_exclusions() {
    let wide = DataFrame::new(vec![
        ("a", ArrayValues::from_i64(vec![1, 2])),
        ("b", ArrayValues::from_i64(vec![3, 4])),
        ("c", ArrayValues::from_i64(vec![5, 6])),
    ])
    .unwrap();
    let c = ColumnSelector::new(wide).with_exclusions(vec!["c"]);

    let view = c.get_item(["a", "b"]).unwrap();
    match view.obj_with_exclusions().unwrap() {
        FrameObject::Frame(f) => assert_eq!(f.columns(), &["a".to_string(), "b".to_string()]),
        other => panic!("unexpected {:?}", other),
    }
    match view.aggregate(AggFunc::Sum).unwrap() {
        AggResult::Series(s) => assert_eq!(s.to_list(), vec![Scalar::Int(3), Scalar::Int(7)]),
        other => panic!("expected a series, got {:?}", other),
    }

    // A selection may name an excluded label explicitly.
    match c.get_item("c").unwrap().aggregate(AggFunc::Sum).unwrap() {
        AggResult::Scalar(s) => assert_eq!(s, Scalar::Int(11)),
        other => panic!("expected a scalar, got {:?}", other),
    }

    match c.obj_with_exclusions().unwrap() {
        FrameObject::Frame(f) => assert_eq!(f.columns(), &["a".to_string(), "b".to_string()]),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_series_object_has_no_label_space() {
    let c = ColumnSelector::new(Series::from_i64(vec![1, 2]).with_name("x"));
    assert_eq!(c.ndim(), 1);
    assert!(c.get_item("x").is_err());
    match c.aggregate(AggFunc::Count).unwrap() {
        AggResult::Scalar(s) => assert_eq!(s, Scalar::Int(2)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_infer_selection() {
    let c = ColumnSelector::new(frame());
    let series = FrameObject::from(Series::from_i64(vec![1]).with_name("a"));
    let both = FrameObject::from(frame());

    let label = Selection::from("a");
    assert_eq!(c.infer_selection(Some(&label), &series), Some(label.clone()));
    assert_eq!(c.infer_selection(Some(&Selection::from("b")), &series), None);
    assert_eq!(c.infer_selection(None, &series), None);

    assert_eq!(c.infer_selection(Some(&label), &both), Some(label.clone()));
    let same = Selection::from(vec!["a", "b"]);
    assert_eq!(c.infer_selection(Some(&same), &both), Some(same.clone()));
    let reordered = Selection::from(vec!["b", "a"]);
    assert_eq!(c.infer_selection(Some(&reordered), &both), None);
    assert_eq!(c.infer_selection(None, &both), None);
}

//==================================================================================
// Arithmetic dispatch
//==================================================================================

#[test]
fn test_scenario_name_reconciliation() {
    let s1 = Series::from_i64(vec![1, 2, 3]).with_name("x");
    let s2 = Series::from_i64(vec![1, 1, 1]).with_name("x");
    let s3 = Series::from_i64(vec![1, 1, 1]).with_name("y");

    let same = s1.add(&s2).unwrap();
    assert_eq!(same.name(), Some("x"));
    assert_eq!(same.to_list(), vec![Scalar::Int(2), Scalar::Int(3), Scalar::Int(4)]);

    assert_eq!(s1.add(&s3).unwrap().name(), None);
    assert_eq!(s1.add(&Series::from_i64(vec![0, 0, 0])).unwrap().name(), None);
    assert_eq!(s1.mul(2).unwrap().name(), Some("x"));
}

#[test]
fn test_range_operand_matches_materialized() {
    let s = Series::from_i64(vec![10, 20, 30, 40, 50]);
    let lazy = s.sub(Index::range(0, 5, 1).unwrap().values().clone()).unwrap();
    let eager = s.sub(ArrayValues::from_i64(vec![0, 1, 2, 3, 4])).unwrap();
    assert!(lazy.values().equals(eager.values()));

    let index = Index::range(0, 5, 1).unwrap();
    let via_index = s.sub(&index).unwrap();
    assert!(via_index.values().equals(eager.values()));
    assert_eq!(via_index.name(), None);
}

#[test]
fn test_arith_leaves_ambient_policy_untouched() {
    let _outer = errstate(ErrState::all(ErrAction::Raise));
    let s = Series::from_f64(vec![1.0, 0.0]);
    let out = s.truediv(0.0).unwrap();
    assert_eq!(out.values().get(0), Scalar::Float(f64::INFINITY));
    assert_eq!(geterr(), ErrState::all(ErrAction::Raise));

    let err = s.add(Series::from_f64(vec![1.0]).to_operand()).unwrap_err();
    assert!(matches!(err, crate::error::TabulaError::ValueError(_)));
    assert_eq!(geterr(), ErrState::all(ErrAction::Raise));
}

#[test]
fn test_reflected_and_masked_arithmetic() {
    let s = Series::new(ArrayValues::masked_i64(vec![Some(2), None])).with_name("m");
    let out = s.rsub(10).unwrap();
    assert_eq!(out.dtype(), DType::MaskedInt64);
    assert_eq!(out.to_list(), vec![Scalar::Int(8), Scalar::Null]);
    assert!(out.hasnans());

    let strings = Series::from_strs(&["a", "b"]);
    assert_eq!(
        strings.radd(Operand::from(">")).unwrap().to_list(),
        vec![Scalar::Str(">a".into()), Scalar::Str(">b".into())]
    );
}

#[test]
fn test_string_repeat_too_long_fails_cleanly() {
    let s = Series::from_strs(&["ab"]);
    let err = s.mul(i64::MAX).unwrap_err();
    assert!(matches!(err, crate::error::TabulaError::ValueError(_)));
    assert_eq!(s.mul(2).unwrap().to_list(), vec![Scalar::Str("abab".into())]);
}

//==================================================================================
// Factorize and search
//==================================================================================

#[test]
fn test_factorize_round_trip() {
    let s = Series::from_strs(&["b", "a", "c", "a"]);
    for sort in [false, true] {
        let (codes, uniques) = s.factorize(sort, true).unwrap();
        let uniques = match uniques {
            FactorizedUniques::Values(v) => v,
            FactorizedUniques::Index(_) => panic!("series callers get raw values"),
        };
        let rebuilt: Vec<Scalar> = codes.iter().map(|&c| uniques.get(c as usize)).collect();
        assert_eq!(rebuilt, s.to_list());
    }

    let index = Index::from_labels(&["x", "y", "x"]);
    let (codes, uniques) = index.factorize(false, true).unwrap();
    assert_eq!(codes, vec![0, 1, 0]);
    assert!(matches!(uniques, FactorizedUniques::Index(_)));
}

#[test]
fn test_factorize_masked_keeps_dtype() {
    let s = Series::new(ArrayValues::masked_i64(vec![Some(5), None, Some(5)]));
    let (codes, uniques) = s.factorize(false, true).unwrap();
    assert_eq!(codes, vec![0, -1, 0]);
    assert_eq!(uniques.values().dtype(), DType::MaskedInt64);
}

#[test]
fn test_searchsorted_rejects_containers() {
    let s = Series::from_i64(vec![1, 2, 3]);
    let err = s
        .searchsorted(&Index::range(0, 2, 1).unwrap(), Side::Left, None)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "ValueError: Value must be 1-D array-like or scalar, RangeIndex is not supported"
    );
    let err = s.searchsorted(&Index::from_labels(&["a"]), Side::Left, None).unwrap_err();
    assert!(err.to_string().contains("Index is not supported"));
    let err = s.searchsorted(&frame(), Side::Left, None).unwrap_err();
    assert!(err.to_string().contains("DataFrame"));
}

#[test]
fn test_searchsorted_positions() {
    let s = Series::from_i64(vec![1, 3, 5]);
    assert_eq!(
        s.searchsorted(&Scalar::Int(3), Side::Right, None).unwrap(),
        Positions::Single(2)
    );
    let targets = ArrayValues::from_i64(vec![0, 4]);
    assert_eq!(
        s.searchsorted(&targets, Side::Left, None).unwrap(),
        Positions::Many(vec![0, 2])
    );

    let range = Index::range(0, 10, 2).unwrap();
    assert_eq!(
        range.searchsorted(&Scalar::Int(4), Side::Left, None).unwrap(),
        Positions::Single(2)
    );
    let descending = Index::range(10, 0, -2).unwrap();
    let sorter = [4, 3, 2, 1, 0];
    assert_eq!(
        descending
            .searchsorted(&Scalar::Int(4), Side::Left, Some(&sorter))
            .unwrap(),
        Positions::Single(1)
    );
}

//==================================================================================
// Memory, mapping and delegations
//==================================================================================

#[test]
fn test_memory_usage_by_representation() {
    assert_eq!(Index::range(0, 1000, 1).unwrap().memory_usage(true), 24);
    let masked = Series::new(ArrayValues::masked_i64(vec![Some(1), None]));
    assert_eq!(masked.memory_usage(false), 2 * 8 + 2);
    let objects = Series::from_strs(&["abc"]);
    assert_eq!(objects.memory_usage(false), 8);
    assert_eq!(objects.memory_usage(true), 8 + 49 + 3);
}

#[test]
fn test_map_values() {
    let masked = Series::new(ArrayValues::masked_i64(vec![Some(1), None]));
    let bump = Mapper::func(|s: &Scalar| Scalar::Int(s.as_i64().unwrap_or(0) + 1));
    let out = masked.map_values(&bump, Some(NaAction::Ignore), true).unwrap();
    assert_eq!(out.dtype(), DType::MaskedInt64);
    assert_eq!(out.to_scalars(), vec![Scalar::Int(2), Scalar::Null]);

    let lookup = Series::from_strs(&["one", "two"])
        .with_index(Index::new(ArrayValues::from_i64(vec![1, 2])))
        .unwrap();
    let keys = Series::from_i64(vec![2, 1, 9]);
    let out = keys
        .map_values(&Mapper::series(&lookup).unwrap(), None, true)
        .unwrap();
    assert_eq!(
        out.to_scalars(),
        vec![Scalar::Str("two".into()), Scalar::Str("one".into()), Scalar::Null]
    );
}

#[test]
fn test_value_counts_series() {
    let s = Series::from_strs(&["a", "b", "a"]).with_name("letters");
    let counts = s.value_counts(false, true, false, true).unwrap();
    assert_eq!(counts.name(), Some("count"));
    assert_eq!(counts.index().and_then(|i| i.name()), Some("letters"));
    assert_eq!(counts.get(&Scalar::Str("a".into())).unwrap(), Scalar::Int(2));

    let shares = s.value_counts(true, true, false, true).unwrap();
    assert_eq!(shares.name(), Some("proportion"));
    assert_eq!(shares.to_list()[1], Scalar::Float(1.0 / 3.0));
}

#[test]
fn test_unique_family() {
    let s = Series::new(ArrayValues::from_f64(vec![1.0, f64::NAN, 1.0, 2.0]));
    assert_eq!(s.unique().unwrap().len(), 3);
    assert_eq!(s.nunique(true).unwrap(), 2);
    assert_eq!(s.nunique(false).unwrap(), 3);
    assert!(!s.is_unique().unwrap());
    assert!(!s.is_monotonic_increasing());
    assert_eq!(s.duplicated(Keep::First).count_ones(), 1);
    assert_eq!(s.drop_duplicates(Keep::First).unwrap().len(), 3);

    let ordered = Index::range(0, 5, 1).unwrap();
    assert!(ordered.is_unique().unwrap());
    assert!(ordered.is_monotonic_increasing());
}

#[test]
fn test_introspection_helpers() {
    let s = Series::from_f64(vec![3.0, f64::NAN, 7.0]);
    assert_eq!(s.shape(), (3,));
    assert_eq!(IndexOpsMixin::ndim(&s), 1);
    assert_eq!(s.nbytes(), 24);
    assert_eq!(s.argmax(true).unwrap(), 2);
    assert_eq!(s.argmin(true).unwrap(), 0);
    assert!(s.argmax(false).is_err());
    assert!(s.item().is_err());
    assert_eq!(Series::from_i64(vec![9]).item().unwrap(), Scalar::Int(9));

    let array = s.to_numpy(Some(0.0)).unwrap();
    assert_eq!(array.to_vec(), vec![3.0, 0.0, 7.0]);
    assert!(Series::from_strs(&["a"]).to_numpy(None).is_err());
    assert_eq!(s.transpose().len(), 3);
}
