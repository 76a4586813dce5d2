/*!

This is the long-form manual for `brcma_matrix` and the `brcma` command line.

## The matrix

A matrix relates `n` requirements (rows) to `m` criteria (columns):
* `R`, `C`: the labels. They are only used for display, and they do not need to be unique.
  Every reference to a requirement or a criterion is made by position.
* `S`: the similarity between each requirement and each criterion. Values are always in `[0, 1]`;
  anything outside this range is clamped when it is written.
* `WRC`: one weight per requirement.
* `WEC`: one weight per criterion.
* the thresholds `thr_sr` (strong requirement, default `0.75`), `thr_wr` (weak requirement,
  default `0.30`) and `thr_mr` (missing criterion, default `0.30`).

The scores themselves are computed by the analysis service.

## Input formats

### `csv`

Comma-separated text, one row per line:

```text
,c1,c2,c3,WRC
r1,0.9,0.8,0.6,1
r2,0.2,0.4,0.3,1
WEC,1,1,1,
```

* The first row lists the criteria. The list stops at the first empty cell or at the `WRC`
  marker. If neither is present, the last cell of the row is ignored.
* The rows that follow are requirements: a label, one similarity value per criterion, then the
  weight of the requirement. Rows with an empty label or a single cell are ignored.
* The first row that starts with `WEC` holds the weights of the criteria. It is optional: all the
  weights default to `1` without it.
* The markers are compared without regard to case.

Unreadable values never stop the import: a similarity that cannot be read is `0`, and a weight that
cannot be read is `1`. Numbers are read from the start of the cell, so `0.7 (approx)` is `0.7`.
The import fails only if the file has fewer than 3 rows, if no criterion is named, or if no
requirement is found.

Cells can be quoted (`"cost, time"`), and the export quotes every cell that contains the
delimiter or a quote. Infinite weights are written as `Infinity`.

The delimiter and both markers can be changed in the settings file.

### `xlsx`

An Excel workbook with the same layout. The first worksheet is used unless a worksheet name
is provided.

## Export

The export always writes the `WRC` column and the `WEC` row, from the matrix as it currently is
(including edits made after the import).

## Reading the results

For each requirement:
* `strong`: listed in `SR`;
* `weak`: listed in `WR` but not in `SR`;
* `revisit`: everything else. A requirement does not need to be listed in `RR` to get this status.

For each criterion: `missing` when listed in `MR`, `covered` otherwise.

Duplicated indices are counted once and negative indices are ignored. Indices beyond the matrix
are reported with a generated label such as `R4` or `C7`.

*/
