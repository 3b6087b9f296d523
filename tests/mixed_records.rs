//! Records mixing option, either, and single fields across every flag
//! assignment

use bumpalo::Bump;
use dynrec::{EitherKey, FieldList, Instance, LayoutContext, OptionKey, Record, SingleKey};

enum Mixed {}

struct MixedKeys {
    first_option: OptionKey<Mixed, i64>,
    selectable: EitherKey<Mixed, f32, f64>,
    second_option: OptionKey<Mixed, i32>,
    constant: SingleKey<Mixed, i64>,
}

impl Record for Mixed {
    const NAME: &'static str = "mixed";
    const FIELD_COUNT: usize = 4;
    type Keys = MixedKeys;

    fn declare(fields: &mut FieldList<Self>) -> MixedKeys {
        let enable = fields.flag("enable_option");
        let right = fields.flag("right_select");
        MixedKeys {
            first_option: fields.option("first_option", enable),
            selectable: fields.either("selectable", right),
            second_option: fields.option("second_option", enable),
            constant: fields.single("constant"),
        }
    }
}

fn context(enable_option: bool, right_select: bool) -> (LayoutContext, MixedKeys) {
    let mut ctx = LayoutContext::new();
    let keys = ctx.register::<Mixed>();
    let enable = ctx.define_flag("enable_option");
    let right = ctx.define_flag("right_select");
    ctx.set_flag(enable, enable_option);
    ctx.set_flag(right, right_select);
    ctx.recompute::<Mixed>().unwrap();
    (ctx, keys)
}

#[test]
fn everything_present_and_wide() {
    let (ctx, keys) = context(true, true);
    let mut inst = Instance::<Mixed>::allocate(&ctx).unwrap();

    inst.fields_mut().set_opt(keys.first_option, 35).unwrap();
    inst.fields_mut().set_either(keys.selectable, 350.0).unwrap();
    inst.fields_mut().set_opt(keys.second_option, 32).unwrap();
    inst.fields_mut().set(keys.constant, 100).unwrap();

    assert_eq!(inst.fields().get_opt(keys.first_option).unwrap(), 35);
    assert_eq!(inst.fields().get_either(keys.selectable).unwrap(), 350.0);
    assert_eq!(inst.fields().get_opt(keys.second_option).unwrap(), 32);
    assert_eq!(inst.fields().get(keys.constant).unwrap(), 100);
    assert_eq!(ctx.dynamic_size::<Mixed>().unwrap(), 8 + 8 + 4 + 8);
}

#[test]
fn options_disabled_and_wide() {
    let (ctx, keys) = context(false, true);
    let mut inst = Instance::<Mixed>::allocate(&ctx).unwrap();

    inst.fields_mut().set_either(keys.selectable, 350.0).unwrap();
    inst.fields_mut().set(keys.constant, 100).unwrap();

    assert_eq!(inst.fields().get_either(keys.selectable).unwrap(), 350.0);
    assert_eq!(inst.fields().get(keys.constant).unwrap(), 100);
    assert_eq!(ctx.dynamic_size::<Mixed>().unwrap(), 8 + 8);
}

#[test]
fn options_enabled_and_narrow() {
    let (ctx, keys) = context(true, false);
    let mut inst = Instance::<Mixed>::allocate(&ctx).unwrap();

    inst.fields_mut().set_opt(keys.first_option, 3100).unwrap();
    inst.fields_mut()
        .set_either_first(keys.selectable, 100.0f32)
        .unwrap();
    inst.fields_mut().set_opt(keys.second_option, 100).unwrap();
    inst.fields_mut().set(keys.constant, 250).unwrap();

    assert_eq!(inst.fields().get_opt(keys.first_option).unwrap(), 3100);
    assert_eq!(
        inst.fields().get_either_first(keys.selectable).unwrap(),
        100.0f32
    );
    assert_eq!(inst.fields().get_opt(keys.second_option).unwrap(), 100);
    assert_eq!(inst.fields().get(keys.constant).unwrap(), 250);
    assert_eq!(ctx.dynamic_size::<Mixed>().unwrap(), 8 + 4 + 4 + 8);
}

#[test]
fn options_disabled_and_narrow() {
    let (ctx, keys) = context(false, false);
    let mut inst = Instance::<Mixed>::allocate(&ctx).unwrap();

    inst.fields_mut()
        .set_either_first(keys.selectable, 100.0f32)
        .unwrap();
    inst.fields_mut().set(keys.constant, 250).unwrap();

    assert_eq!(
        inst.fields().get_either_first(keys.selectable).unwrap(),
        100.0f32
    );
    assert_eq!(inst.fields().get(keys.constant).unwrap(), 250);
    assert_eq!(ctx.dynamic_size::<Mixed>().unwrap(), 4 + 8);
}

#[test]
fn total_size_is_the_field_sum_under_every_flag_assignment() {
    for enable in [false, true] {
        for right in [false, true] {
            let (ctx, keys) = context(enable, right);
            let inst = Instance::<Mixed>::allocate(&ctx).unwrap();

            let sum = inst.fields().field_size(keys.first_option)
                + inst.fields().field_size(keys.selectable)
                + inst.fields().field_size(keys.second_option)
                + inst.fields().field_size(keys.constant);
            assert_eq!(inst.size(), sum);

            let layout = inst.layout();
            let mut running = 0;
            for slot in 0..layout.field_count() {
                assert_eq!(layout.shape(slot).descriptor().offset, running);
                running += layout.field_size(slot);
            }
        }
    }
}

#[test]
fn toggling_presence_changes_the_total_by_the_option_sizes() {
    let (mut ctx, _) = context(false, true);
    let disabled = ctx.dynamic_size::<Mixed>().unwrap();

    let enable = ctx.define_flag("enable_option");
    ctx.set_flag(enable, true);
    ctx.recompute::<Mixed>().unwrap();
    let enabled = ctx.dynamic_size::<Mixed>().unwrap();

    // the two options are an i64 and an i32
    assert_eq!(enabled - disabled, 8 + 4);
}

fn fill(mut view: dynrec::RecordMut<'_, Mixed>, keys: &MixedKeys) {
    view.set_opt(keys.first_option, 35).unwrap();
    view.set_either(keys.selectable, 350.0).unwrap();
    view.set_opt(keys.second_option, 32).unwrap();
    view.set(keys.constant, 100).unwrap();
}

#[test]
fn arena_instances_behave_like_heap_instances() {
    let (ctx, keys) = context(true, true);
    let arena = Bump::new();

    let mut on_heap = Instance::<Mixed>::allocate(&ctx).unwrap();
    let mut in_arena = Instance::<Mixed>::construct_in_arena(&ctx, &arena).unwrap();

    fill(on_heap.fields_mut(), &keys);
    fill(in_arena.fields_mut(), &keys);

    assert_eq!(on_heap.as_bytes(), in_arena.as_bytes());
}

#[test]
fn field_level_copy_moves_one_field_between_instances() {
    let (ctx, keys) = context(true, true);
    let mut a = Instance::<Mixed>::allocate(&ctx).unwrap();
    let mut b = Instance::<Mixed>::allocate(&ctx).unwrap();

    a.fields_mut().set_either(keys.selectable, 123.0).unwrap();
    a.fields_mut().set(keys.constant, 7).unwrap();
    b.fields_mut().set_either(keys.selectable, 999.0).unwrap();

    b.fields_mut()
        .copy_field_from(keys.selectable, &a.fields())
        .unwrap();

    assert_eq!(b.fields().get_either(keys.selectable).unwrap(), 123.0);
    // only the addressed field moved
    assert_eq!(b.fields().get(keys.constant).unwrap(), 0);
}
